//! Economy tests through the facade, plus randomized conservation
//! checks over whole hands.

use commonware_cryptography::{ed25519::PrivateKey, Signer};
use holecard_types::{Event, GamePhase, CHIPS_PER_FUNDING_UNIT, FREE_CHIP_GRANT};
use proptest::prelude::*;

use crate::{Casino, Error};

type PublicKey = commonware_cryptography::ed25519::PublicKey;

fn player(seed: u64) -> PublicKey {
    PrivateKey::from_seed(seed).public_key()
}

fn casino() -> (Casino, PublicKey) {
    let owner = player(100);
    let mut casino = Casino::new(owner.clone(), [7u8; 32]);
    casino.set_randomness_beacon(&owner, [9u8; 32]).unwrap();
    (casino, owner)
}

#[test]
fn test_free_chip_claim_is_one_shot() {
    let (mut casino, _owner) = casino();
    let alice = player(1);
    let events = casino.claim_free_chips(&alice).unwrap();
    assert!(matches!(
        events[0],
        Event::FreeChipsClaimed {
            amount: FREE_CHIP_GRANT,
            ..
        }
    ));
    assert_eq!(casino.balance(&alice), FREE_CHIP_GRANT);
    assert_eq!(casino.claim_free_chips(&alice), Err(Error::AlreadyClaimed));
    assert_eq!(casino.balance(&alice), FREE_CHIP_GRANT);
}

#[test]
fn test_buy_and_withdraw_events() {
    let (mut casino, _owner) = casino();
    let alice = player(1);

    let events = casino.buy_chips(&alice, 3).unwrap();
    assert!(matches!(
        events[0],
        Event::ChipsPurchased { chips: 3_000, .. }
    ));
    assert_eq!(casino.balance(&alice), 3 * CHIPS_PER_FUNDING_UNIT);

    let events = casino.withdraw_chips(&alice, 2_000).unwrap();
    assert!(matches!(
        events[0],
        Event::ChipsWithdrawn { chips: 2_000, .. }
    ));
    assert_eq!(casino.balance(&alice), 1_000);

    // Only whole funding units convert back.
    assert_eq!(
        casino.withdraw_chips(&alice, 500),
        Err(Error::NotConvertible)
    );
    assert_eq!(
        casino.withdraw_chips(&alice, 2_000),
        Err(Error::InsufficientFunds {
            required: 2_000,
            available: 1_000,
        })
    );
    assert_eq!(casino.buy_chips(&alice, 0), Err(Error::ZeroAmount));
}

#[test]
fn test_economy_closed_while_seated() {
    let (mut casino, owner) = casino();
    let alice = player(1);
    let bob = player(2);
    casino.buy_chips(&alice, 10).unwrap();
    casino.buy_chips(&bob, 10).unwrap();
    casino.create_table(&owner, 1_000, 10_000, 0).unwrap();
    casino.join_table(&alice, 0, 5_000, 1).unwrap();

    // Seated actors cannot mint, convert, or claim into their wallet.
    assert_eq!(casino.buy_chips(&alice, 1), Err(Error::AlreadySeated));
    assert_eq!(
        casino.withdraw_chips(&alice, 1_000),
        Err(Error::AlreadySeated)
    );
    assert_eq!(casino.claim_free_chips(&alice), Err(Error::AlreadySeated));
    assert_eq!(casino.balance(&alice), 5_000);

    // Unseated actors are unaffected, and standing up reopens the wallet.
    casino.claim_free_chips(&bob).unwrap();
    casino.leave_table(&alice, 0, 2).unwrap();
    casino.buy_chips(&alice, 1).unwrap();
    casino.withdraw_chips(&alice, 1_000).unwrap();
    casino.claim_free_chips(&alice).unwrap();
}

#[test]
fn test_bank_operations_are_owner_only() {
    let (mut casino, owner) = casino();
    let alice = player(1);

    assert_eq!(casino.fund_bank(&alice, 1_000), Err(Error::NotOwner));
    assert_eq!(casino.defund_bank(&alice, 1_000), Err(Error::NotOwner));

    let events = casino.fund_bank(&owner, 50_000).unwrap();
    assert!(matches!(events[0], Event::BankFunded { amount: 50_000 }));
    assert_eq!(casino.bank(), 50_000);

    let events = casino.defund_bank(&owner, 20_000).unwrap();
    assert!(matches!(events[0], Event::BankDefunded { amount: 20_000 }));
    assert_eq!(casino.bank(), 30_000);

    assert_eq!(
        casino.defund_bank(&owner, 40_000),
        Err(Error::BankUnderfunded {
            required: 40_000,
            available: 30_000,
        })
    );
}

/// Build a funded two-player table, run a hand with the given bets (all
/// players stand), and return the casino for inspection.
fn play_one_hand(bank: u64, buy_in: u64, bet_a: u64, bet_b: u64) -> Casino {
    let (mut casino, owner) = casino();
    let alice = player(1);
    let bob = player(2);
    casino.fund_bank(&owner, bank).unwrap();
    casino.buy_chips(&alice, buy_in / CHIPS_PER_FUNDING_UNIT + 1).unwrap();
    casino.buy_chips(&bob, buy_in / CHIPS_PER_FUNDING_UNIT + 1).unwrap();
    casino.create_table(&owner, 1_000, 10_000, 0).unwrap();
    casino.join_table(&alice, 0, buy_in, 1).unwrap();
    casino.join_table(&bob, 0, buy_in, 2).unwrap();

    casino.place_bet(&alice, 0, bet_a, 10).unwrap();
    casino.place_bet(&bob, 0, bet_b, 11).unwrap();
    while let Some(actor) = casino.next_actor(0) {
        casino.stand(&actor, 0, 12).unwrap();
    }
    casino
}

proptest! {
    /// No hand creates or destroys chips, whatever the bets, and the
    /// bank never pays out more than the recorded payouts.
    #[test]
    fn chips_conserved_across_a_hand(
        bank in 100_000u64..1_000_000,
        bet_a in 100u64..=5_000,
        bet_b in 100u64..=5_000,
    ) {
        let casino = play_one_hand(bank, 5_000, bet_a, bet_b);

        let minted = 2 * (5_000 / CHIPS_PER_FUNDING_UNIT + 1) * CHIPS_PER_FUNDING_UNIT;
        prop_assert_eq!(casino.total_chips(), bank + minted);

        let result = casino.last_hand(0).ok_or_else(|| {
            TestCaseError::fail("hand did not settle")
        })?;
        prop_assert_eq!(result.pot, bet_a + bet_b);
        let payouts: u64 = result.results.iter().map(|r| r.payout).sum();
        prop_assert_eq!(casino.bank(), bank + result.pot - payouts);

        // The table came back to rest.
        let snapshot = casino.snapshot(0).ok_or_else(|| {
            TestCaseError::fail("table missing")
        })?;
        prop_assert_eq!(snapshot.phase, GamePhase::WaitingForPlayers);
    }

    /// Every recorded payout respects the outcome table.
    #[test]
    fn payouts_match_outcomes(
        bet_a in 100u64..=5_000,
        bet_b in 100u64..=5_000,
    ) {
        let casino = play_one_hand(1_000_000, 5_000, bet_a, bet_b);
        let result = casino.last_hand(0).ok_or_else(|| {
            TestCaseError::fail("hand did not settle")
        })?;
        for player_result in &result.results {
            let bet = player_result.bet;
            let expected = match player_result.outcome {
                holecard_types::Outcome::Lose => 0,
                holecard_types::Outcome::Push => bet,
                holecard_types::Outcome::Win => bet * 2,
                holecard_types::Outcome::Blackjack => bet + bet * 3 / 2,
            };
            prop_assert_eq!(player_result.payout, expected);
        }
    }
}
