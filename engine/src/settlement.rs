//! Hand settlement: dealer rule, outcome table, and the bank-backed
//! payout commit.

use holecard_types::{
    hand_total, is_natural, Event, HandResult, Outcome, PlayerResult, Table,
};

use crate::{ledger::Ledger, seal::SealedCardStore, Error};

/// Dealer draws to 17 and hits soft 17 (H17).
pub fn dealer_should_hit(cards: &[holecard_types::Card]) -> bool {
    let (total, soft) = hand_total(cards);
    total < 17 || (total == 17 && soft)
}

/// Resolve one player's hand against the dealer. Returns the outcome and
/// the chips returned to the stack (stake included).
pub fn outcome_for(
    cards: &[holecard_types::Card],
    bet: u64,
    dealer_total: u8,
    dealer_busted: bool,
) -> (Outcome, u64) {
    let (total, _) = hand_total(cards);
    if total > 21 {
        return (Outcome::Lose, 0);
    }
    if !dealer_busted {
        if total < dealer_total {
            return (Outcome::Lose, 0);
        }
        if total == dealer_total {
            return (Outcome::Push, bet);
        }
    }
    if is_natural(cards) {
        // Natural pays 3:2 on top of the returned stake.
        (
            Outcome::Blackjack,
            bet.saturating_add(bet.saturating_mul(3) / 2),
        )
    } else {
        (Outcome::Win, bet.saturating_mul(2))
    }
}

/// Settle the hand: pot to the bank, payouts from the bank, dealer seals
/// promoted to public, and the audit record stored on the table.
///
/// All outcomes are computed before any balance moves; if the bank plus
/// the pot cannot cover the payouts, nothing is mutated.
pub fn settle(
    table: &mut Table,
    ledger: &mut Ledger,
    seals: &mut SealedCardStore,
    now: u64,
) -> Result<Vec<Event>, Error> {
    let (dealer_total, _) = hand_total(&table.dealer.cards);
    let dealer_busted = dealer_total > 21;

    let mut pot: u64 = 0;
    let mut total_payouts: u64 = 0;
    let mut results = Vec::new();
    for seat in table.seats.iter().filter(|seat| seat.is_active) {
        let bet = seat.current_bet;
        let (outcome, payout) = outcome_for(&seat.cards, bet, dealer_total, dealer_busted);
        pot = pot.saturating_add(bet);
        total_payouts = total_payouts.saturating_add(payout);
        results.push(PlayerResult {
            player: seat.public.clone(),
            bet,
            total: hand_total(&seat.cards).0,
            outcome,
            payout,
            cards: seat.cards.clone(),
        });
    }

    let available = ledger.bank().saturating_add(pot);
    if total_payouts > available {
        return Err(Error::BankUnderfunded {
            required: total_payouts,
            available,
        });
    }

    // Commit: stakes to the bank first, then payouts out of it.
    ledger.credit_bank(pot);
    let mut events = Vec::new();
    for result in &results {
        events.push(Event::WinnerDetermined {
            table_id: table.id,
            player: result.player.clone(),
            outcome: result.outcome,
            payout: result.payout,
        });
        if result.payout > 0 {
            ledger.debit_bank(result.payout)?;
            if let Some(seat) = table
                .seats
                .iter_mut()
                .find(|seat| seat.public == result.player)
            {
                seat.table_stack = seat.table_stack.saturating_add(result.payout);
            }
            events.push(Event::PayoutSent {
                table_id: table.id,
                player: result.player.clone(),
                amount: result.payout,
            });
        }
    }

    for sealed in &table.dealer.seals {
        seals.reveal_card_public(sealed);
    }

    tracing::info!(
        table_id = table.id,
        dealer_total,
        dealer_busted,
        pot,
        payouts = total_payouts,
        "hand settled"
    );

    table.last_hand = Some(HandResult {
        dealer_cards: table.dealer.cards.clone(),
        dealer_total,
        dealer_busted,
        results,
        pot,
        timestamp: now,
        dealer_seals: table.dealer.seals.clone(),
    });
    events.push(Event::HandResultStored {
        table_id: table.id,
        pot,
        timestamp: now,
    });
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, Signer};
    use holecard_types::{Card, Seat};

    fn player(seed: u64) -> commonware_cryptography::ed25519::PublicKey {
        PrivateKey::from_seed(seed).public_key()
    }

    fn card(rank: u8, suit: u8) -> Card {
        Card { rank, suit }
    }

    #[test]
    fn test_dealer_hits_soft_17() {
        // A + 6 = soft 17: hit.
        assert!(dealer_should_hit(&[card(14, 0), card(6, 1)]));
        // 10 + 7 = hard 17: stand.
        assert!(!dealer_should_hit(&[card(10, 0), card(7, 1)]));
        // 16: hit.
        assert!(dealer_should_hit(&[card(10, 0), card(6, 1)]));
        // 18: stand.
        assert!(!dealer_should_hit(&[card(10, 0), card(8, 1)]));
    }

    #[test]
    fn test_outcome_table() {
        let natural = [card(14, 0), card(13, 1)];
        let twenty = [card(10, 0), card(10, 1)];
        let busted = [card(10, 0), card(9, 1), card(5, 2)];

        // Natural beating the dealer pays 3:2 (bet 2000 -> 5000 back).
        assert_eq!(
            outcome_for(&natural, 2_000, 19, false),
            (Outcome::Blackjack, 5_000)
        );
        // Plain win pays even money.
        assert_eq!(outcome_for(&twenty, 500, 18, false), (Outcome::Win, 1_000));
        // Dealer bust is a win for any standing hand.
        assert_eq!(outcome_for(&twenty, 500, 25, true), (Outcome::Win, 1_000));
        // Tie refunds the stake, natural included (dealer 21 vs natural 21).
        assert_eq!(outcome_for(&twenty, 500, 20, false), (Outcome::Push, 500));
        assert_eq!(
            outcome_for(&natural, 500, 21, false),
            (Outcome::Push, 500)
        );
        // Bust loses even against a dealer bust.
        assert_eq!(outcome_for(&busted, 500, 25, true), (Outcome::Lose, 0));
        assert_eq!(outcome_for(&twenty, 500, 21, false), (Outcome::Lose, 0));
    }

    fn settled_table() -> (Table, Ledger, SealedCardStore) {
        let mut table = Table::new(0, 1_000, 10_000, 0);
        let mut ledger = Ledger::new();
        let mut seals = SealedCardStore::new(&[1u8; 32]);

        // Dealer: 10 + 7 = 17.
        table.dealer.cards = vec![card(10, 0), card(7, 1)];
        table.dealer.seals = vec![
            seals.seal_card(card(10, 0), None),
            seals.seal_card(card(7, 1), None),
        ];
        table.dealer.has_finished = true;

        // Seat 1: natural, bet 2000 escrowed out of a 10000 buy-in.
        let mut one = Seat::new(player(1), 8_000);
        one.current_bet = 2_000;
        one.is_active = true;
        one.cards = vec![card(14, 2), card(13, 3)];
        one.seals = vec![
            seals.seal_card(card(14, 2), Some(&player(1))),
            seals.seal_card(card(13, 3), Some(&player(1))),
        ];
        table.seats.push(one);

        // Seat 2: 17, pushes.
        let mut two = Seat::new(player(2), 4_500);
        two.current_bet = 500;
        two.is_active = true;
        two.cards = vec![card(10, 2), card(7, 3)];
        two.seals = vec![
            seals.seal_card(card(10, 2), Some(&player(2))),
            seals.seal_card(card(7, 3), Some(&player(2))),
        ];
        table.seats.push(two);

        ledger.credit_bank(10_000);
        (table, ledger, seals)
    }

    #[test]
    fn test_settle_pays_from_bank_and_stores_result() {
        let (mut table, mut ledger, mut seals) = settled_table();
        let events = settle(&mut table, &mut ledger, &mut seals, 777).unwrap();

        // Natural: 2000 bet returns 5000; stack 8000 -> 13000.
        assert_eq!(table.seats[0].table_stack, 13_000);
        // Push: 500 back; stack 4500 -> 5000.
        assert_eq!(table.seats[1].table_stack, 5_000);
        // Bank: 10000 + pot 2500 - payouts 5500.
        assert_eq!(ledger.bank(), 7_000);

        let result = table.last_hand.as_ref().unwrap();
        assert_eq!(result.dealer_total, 17);
        assert!(!result.dealer_busted);
        assert_eq!(result.pot, 2_500);
        assert_eq!(result.timestamp, 777);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[0].outcome, Outcome::Blackjack);
        assert_eq!(result.results[1].outcome, Outcome::Push);

        // Dealer seals are now world-readable; player seals are not.
        for sealed in &result.dealer_seals {
            assert!(seals.is_public(sealed.rank));
            assert!(seals.is_public(sealed.suit));
        }
        assert!(!seals.is_public(table.seats[0].seals[0].rank));

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::HandResultStored { pot: 2_500, .. })));
    }

    #[test]
    fn test_settle_underfunded_bank_aborts_atomically() {
        let (mut table, _ledger, mut seals) = settled_table();
        // Bank 1000 + pot 2500 cannot cover 5500 of payouts.
        let mut poor = Ledger::new();
        poor.credit_bank(1_000);
        let err = settle(&mut table, &mut poor, &mut seals, 777).unwrap_err();
        assert_eq!(
            err,
            Error::BankUnderfunded {
                required: 5_500,
                available: 3_500,
            }
        );
        // Nothing moved.
        assert_eq!(poor.bank(), 1_000);
        assert_eq!(table.seats[0].table_stack, 8_000);
        assert_eq!(table.seats[1].table_stack, 4_500);
        assert!(table.last_hand.is_none());
        for sealed in &table.dealer.seals {
            assert!(!seals.is_public(sealed.rank));
        }
    }
}
