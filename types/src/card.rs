//! Playing cards.
//!
//! The deck is a permutation of indices `0..=51`, where:
//! - suit = index / 13 (0..=3)
//! - rank = index % 13 + 2 (2..=14; 11=Jack, 12=Queen, 13=King, 14=Ace)

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use crate::DECK_SIZE;

/// Ranks per suit.
const RANKS_PER_SUIT: u8 = 13;

/// Lowest encodable rank (deuce).
pub const MIN_RANK: u8 = 2;

/// Highest encodable rank (Ace).
pub const ACE_RANK: u8 = 14;

/// Highest suit index.
pub const MAX_SUIT: u8 = 3;

/// A single card, immutable once dealt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    /// Rank in `2..=14` (11=J, 12=Q, 13=K, 14=A).
    pub rank: u8,
    /// Suit in `0..=3`.
    pub suit: u8,
}

impl Card {
    /// Decode a card from a canonical deck index.
    ///
    /// Returns `None` if `index >= 52`.
    pub fn from_index(index: u8) -> Option<Self> {
        if index as usize >= DECK_SIZE {
            return None;
        }
        Some(Self {
            rank: index % RANKS_PER_SUIT + MIN_RANK,
            suit: index / RANKS_PER_SUIT,
        })
    }

    /// The canonical deck index for this card.
    pub fn index(&self) -> u8 {
        self.suit * RANKS_PER_SUIT + (self.rank - MIN_RANK)
    }

    /// Blackjack value with Ace counted high (11). Face cards are 10.
    pub fn high_value(&self) -> u8 {
        match self.rank {
            ACE_RANK => 11,
            11..=13 => 10,
            r => r,
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == ACE_RANK
    }

    /// True for Ace plus any ten-valued card (the natural-blackjack pair).
    pub fn is_ten_valued(&self) -> bool {
        self.high_value() == 10
    }

    fn is_valid(&self) -> bool {
        (MIN_RANK..=ACE_RANK).contains(&self.rank) && self.suit <= MAX_SUIT
    }
}

impl Write for Card {
    fn write(&self, writer: &mut impl BufMut) {
        self.rank.write(writer);
        self.suit.write(writer);
    }
}

impl Read for Card {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let card = Self {
            rank: u8::read(reader)?,
            suit: u8::read(reader)?,
        };
        if !card.is_valid() {
            return Err(Error::Invalid("Card", "rank or suit out of range"));
        }
        Ok(card)
    }
}

impl EncodeSize for Card {
    fn encode_size(&self) -> usize {
        self.rank.encode_size() + self.suit.encode_size()
    }
}

/// Total of a blackjack hand and whether it is soft.
///
/// One Ace counts as 11 while that keeps the total at 21 or below; every
/// further Ace (and a demoted one) counts as 1.
pub fn hand_total(cards: &[Card]) -> (u8, bool) {
    let mut total: u16 = 0;
    let mut aces: u8 = 0;

    for card in cards {
        total += card.high_value() as u16;
        if card.is_ace() {
            aces += 1;
        }
    }

    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    let soft = aces > 0 && total <= 21;
    (total.min(255) as u8, soft)
}

/// Two-card 21 (Ace + any ten-valued card).
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_total(cards).0 == 21
}

/// A hand busts once its best total exceeds 21.
pub fn is_busted(cards: &[Card]) -> bool {
    hand_total(cards).0 > 21
}
