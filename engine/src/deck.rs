//! Deck management: seeded shuffles and draws with automatic reshuffle.

use holecard_types::{Card, Deck, DECK_SIZE};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// Fisher-Yates over the canonical 52 indices.
fn shuffled_order(rng: &mut ChaCha20Rng) -> [u8; DECK_SIZE] {
    let mut order = [0u8; DECK_SIZE];
    for (i, slot) in order.iter_mut().enumerate() {
        *slot = i as u8;
    }
    for i in (1..DECK_SIZE).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }
    order
}

/// Replace the deck's permutation and reset its cursor.
pub fn shuffle(deck: &mut Deck, rng: &mut ChaCha20Rng) {
    deck.reset_with(shuffled_order(rng));
}

/// Draw the next card, reshuffling first if the deck is exhausted.
pub fn draw(deck: &mut Deck, rng: &mut ChaCha20Rng) -> Card {
    loop {
        if let Some(index) = deck.next() {
            if let Some(card) = Card::from_index(index) {
                return card;
            }
            // A valid permutation cannot yield an out-of-range index; a
            // reshuffle restores the invariant.
        }
        shuffle(deck, rng);
    }
}
