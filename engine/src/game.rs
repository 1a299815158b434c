//! Per-table hand lifecycle.
//!
//! `WaitingForPlayers -> Dealing -> PlayerTurns -> DealerTurn -> Showdown
//! -> WaitingForPlayers`. Dealing, the dealer turn, and the showdown
//! resolve synchronously inside the call that triggers them; only the
//! betting round and the player turns wait on callers. A settlement the
//! bank cannot cover parks the table at `Showdown` until a retry (see
//! [`force_advance`]) succeeds.

use commonware_cryptography::ed25519::PublicKey;
use holecard_types::{is_natural, Event, GamePhase, Table, TableStatus};
use rand_chacha::ChaCha20Rng;

use crate::{deck, ledger::Ledger, rng, scheduler, seal::SealedCardStore, settlement, Error};

/// Shared engine state a table operation needs alongside the table.
pub struct GameDeps<'a> {
    pub ledger: &'a mut Ledger,
    pub seals: &'a mut SealedCardStore,
    pub beacon: &'a [u8; 32],
}

/// Escrow a wager out of the actor's stack and open their seat for the
/// coming hand. Deals as soon as the last eligible bettor is in.
pub fn place_bet(
    table: &mut Table,
    deps: &mut GameDeps,
    actor: &PublicKey,
    amount: u64,
    now: u64,
) -> Result<Vec<Event>, Error> {
    if table.hand_in_progress() {
        return Err(Error::HandInProgress);
    }
    if table.status != TableStatus::Active {
        return Err(Error::NotBettingPhase);
    }
    let index = table.seat_index(actor).ok_or(Error::NotSeated)?;
    let min = table.min_bet();
    let seat = &mut table.seats[index];
    if seat.current_bet != 0 {
        return Err(Error::BetAlreadyPlaced);
    }
    if amount < min || amount > seat.table_stack {
        return Err(Error::BetOutOfRange {
            min,
            max: seat.table_stack,
            got: amount,
        });
    }

    seat.table_stack -= amount;
    seat.current_bet = amount;
    seat.is_active = true;
    table.last_activity = now;

    tracing::debug!(table_id = table.id, player = ?actor, amount, "bet placed");
    let mut events = vec![Event::BetPlaced {
        table_id: table.id,
        player: actor.clone(),
        amount,
    }];
    if all_bets_in(table) {
        events.extend(begin_deal(table, deps, actor, now)?);
    }
    Ok(events)
}

/// Draw one card for the on-turn actor. Busting or reaching 21 ends the
/// turn.
pub fn hit(
    table: &mut Table,
    deps: &mut GameDeps,
    actor: &PublicKey,
    now: u64,
) -> Result<Vec<Event>, Error> {
    let index = scheduler::ensure_turn(table, actor)?;
    let mut rng = rng::deck_rng(deps.beacon, actor, table.id, now);

    let mut events = vec![Event::PlayerHit {
        table_id: table.id,
        player: actor.clone(),
    }];
    events.push(deal_to_seat(table, deps, &mut rng, index));

    let seat = &mut table.seats[index];
    let (total, _) = holecard_types::hand_total(&seat.cards);
    if total > 21 {
        seat.has_acted = true;
        events.push(Event::PlayerBusted {
            table_id: table.id,
            player: actor.clone(),
        });
    } else if total == 21 {
        // Nothing left to decide; stand automatically.
        seat.has_acted = true;
    }
    table.last_activity = now;

    finish_if_done(table, deps, actor, now, &mut events)?;
    Ok(events)
}

/// End the on-turn actor's participation in the turn order.
pub fn stand(
    table: &mut Table,
    deps: &mut GameDeps,
    actor: &PublicKey,
    now: u64,
) -> Result<Vec<Event>, Error> {
    let index = scheduler::ensure_turn(table, actor)?;
    table.seats[index].has_acted = true;
    table.last_activity = now;

    let mut events = vec![Event::PlayerStood {
        table_id: table.id,
        player: actor.clone(),
    }];
    finish_if_done(table, deps, actor, now, &mut events)?;
    Ok(events)
}

/// Double the wager, draw exactly one card, and end the turn. Only
/// available on the initial two cards with a stack that covers the
/// matching escrow.
pub fn double_down(
    table: &mut Table,
    deps: &mut GameDeps,
    actor: &PublicKey,
    now: u64,
) -> Result<Vec<Event>, Error> {
    let index = scheduler::ensure_turn(table, actor)?;
    {
        let seat = &table.seats[index];
        if seat.cards.len() != 2 {
            return Err(Error::CannotDouble);
        }
        if seat.table_stack < seat.current_bet {
            return Err(Error::InsufficientFunds {
                required: seat.current_bet,
                available: seat.table_stack,
            });
        }
    }

    let mut rng = rng::deck_rng(deps.beacon, actor, table.id, now);
    let new_bet = {
        let seat = &mut table.seats[index];
        seat.table_stack -= seat.current_bet;
        seat.current_bet = seat.current_bet.saturating_mul(2);
        seat.current_bet
    };
    let mut events = vec![Event::PlayerDoubled {
        table_id: table.id,
        player: actor.clone(),
        new_bet,
    }];
    events.push(deal_to_seat(table, deps, &mut rng, index));

    let seat = &mut table.seats[index];
    seat.has_acted = true;
    if holecard_types::is_busted(&seat.cards) {
        events.push(Event::PlayerBusted {
            table_id: table.id,
            player: actor.clone(),
        });
    }
    table.last_activity = now;

    finish_if_done(table, deps, actor, now, &mut events)?;
    Ok(events)
}

/// Permissionless liveness valve. After the turn timeout, resolves
/// exactly one stalled obligation: auto-stands the on-turn player, deals
/// a stalled betting round with the bets already placed, or retries a
/// settlement the bank previously could not cover.
pub fn force_advance(
    table: &mut Table,
    deps: &mut GameDeps,
    caller: &PublicKey,
    now: u64,
) -> Result<Vec<Event>, Error> {
    scheduler::ensure_timeout_elapsed(table, now)?;

    match table.phase {
        GamePhase::PlayerTurns => {
            let index = scheduler::on_turn_index(table).ok_or(Error::NothingToAdvance)?;
            let stalled = table.seats[index].public.clone();
            table.seats[index].has_acted = true;
            table.last_activity = now;
            tracing::info!(table_id = table.id, player = ?stalled, "stalled turn forced");

            let mut events = vec![Event::TurnForced {
                table_id: table.id,
                player: Some(stalled),
            }];
            finish_if_done(table, deps, caller, now, &mut events)?;
            Ok(events)
        }
        GamePhase::WaitingForPlayers => {
            if table.status != TableStatus::Active
                || !table.seats.iter().any(|seat| seat.current_bet > 0)
            {
                return Err(Error::NothingToAdvance);
            }
            // Seats that never bet sit this hand out.
            table.last_activity = now;
            let mut events = vec![Event::TurnForced {
                table_id: table.id,
                player: None,
            }];
            events.extend(begin_deal(table, deps, caller, now)?);
            Ok(events)
        }
        GamePhase::Showdown => {
            // A previous settlement was deferred on bank coverage; retry
            // it. A still-short bank fails here with nothing mutated.
            let mut events = vec![Event::TurnForced {
                table_id: table.id,
                player: None,
            }];
            events.extend(settle_and_reset(table, deps, now)?);
            Ok(events)
        }
        GamePhase::Dealing | GamePhase::DealerTurn => Err(Error::NothingToAdvance),
    }
}

/// Clear all per-hand state. Safe to call on an already reset table.
pub fn reset_hand(table: &mut Table) {
    for seat in &mut table.seats {
        seat.reset_hand();
    }
    table.dealer.reset_hand();
    table.phase = GamePhase::WaitingForPlayers;
}

/// Refund every escrowed bet to its stack and reset, for hands that
/// cannot continue (table dropped below the player minimum).
pub fn abort_hand(table: &mut Table) {
    for seat in &mut table.seats {
        seat.table_stack = seat.table_stack.saturating_add(seat.current_bet);
        seat.current_bet = 0;
    }
    reset_hand(table);
}

/// True once every seat that can still afford the minimum bet has bet.
fn all_bets_in(table: &Table) -> bool {
    let min = table.min_bet();
    let mut bettors = 0usize;
    for seat in &table.seats {
        if seat.current_bet > 0 {
            bettors += 1;
        } else if seat.table_stack >= min {
            return false;
        }
    }
    bettors > 0
}

/// Shuffle, deal two sealed cards to every bettor and the dealer, and
/// hand control to the turn order (or straight to the dealer on a
/// natural short-circuit).
fn begin_deal(
    table: &mut Table,
    deps: &mut GameDeps,
    caller: &PublicKey,
    now: u64,
) -> Result<Vec<Event>, Error> {
    table.phase = GamePhase::Dealing;
    let mut events = vec![Event::PhaseChanged {
        table_id: table.id,
        phase: GamePhase::Dealing,
    }];

    let players: Vec<PublicKey> = table
        .seats
        .iter()
        .filter(|seat| seat.is_active)
        .map(|seat| seat.public.clone())
        .collect();
    tracing::info!(table_id = table.id, players = players.len(), "hand started");
    events.push(Event::HandStarted {
        table_id: table.id,
        players,
    });

    let mut rng = rng::deck_rng(deps.beacon, caller, table.id, now);
    deck::shuffle(&mut table.deck, &mut rng);

    for _ in 0..2 {
        for index in 0..table.seats.len() {
            if table.seats[index].is_active {
                events.push(deal_to_seat(table, deps, &mut rng, index));
            }
        }
    }
    for _ in 0..2 {
        events.push(deal_to_dealer(table, deps, &mut rng));
    }

    // Naturals have nothing to decide; a dealer natural ends every turn.
    let dealer_natural = is_natural(&table.dealer.cards);
    for seat in table.seats.iter_mut().filter(|seat| seat.is_active) {
        if dealer_natural || is_natural(&seat.cards) {
            seat.has_acted = true;
        }
    }

    table.phase = GamePhase::PlayerTurns;
    events.push(Event::PhaseChanged {
        table_id: table.id,
        phase: GamePhase::PlayerTurns,
    });
    finish_if_done(table, deps, caller, now, &mut events)?;
    Ok(events)
}

fn deal_to_seat(
    table: &mut Table,
    deps: &mut GameDeps,
    rng: &mut ChaCha20Rng,
    index: usize,
) -> Event {
    let card = deck::draw(&mut table.deck, rng);
    let owner = table.seats[index].public.clone();
    let sealed = deps.seals.seal_card(card, Some(&owner));
    let seat = &mut table.seats[index];
    seat.cards.push(card);
    seat.seals.push(sealed);
    Event::CardDealt {
        table_id: table.id,
        recipient: Some(owner),
        seal: sealed,
    }
}

fn deal_to_dealer(table: &mut Table, deps: &mut GameDeps, rng: &mut ChaCha20Rng) -> Event {
    let card = deck::draw(&mut table.deck, rng);
    let sealed = deps.seals.seal_card(card, None);
    table.dealer.cards.push(card);
    table.dealer.seals.push(sealed);
    Event::CardDealt {
        table_id: table.id,
        recipient: None,
        seal: sealed,
    }
}

/// Once no seat awaits a turn, play the dealer out and settle.
pub(crate) fn finish_if_done(
    table: &mut Table,
    deps: &mut GameDeps,
    caller: &PublicKey,
    now: u64,
    events: &mut Vec<Event>,
) -> Result<(), Error> {
    if table.phase != GamePhase::PlayerTurns || scheduler::on_turn_index(table).is_some() {
        return Ok(());
    }

    table.phase = GamePhase::DealerTurn;
    events.push(Event::PhaseChanged {
        table_id: table.id,
        phase: GamePhase::DealerTurn,
    });

    let mut rng = rng::deck_rng(deps.beacon, caller, table.id, now);
    let contested = table
        .seats
        .iter()
        .any(|seat| seat.is_active && !holecard_types::is_busted(&seat.cards));
    if contested {
        while settlement::dealer_should_hit(&table.dealer.cards) {
            events.push(deal_to_dealer(table, deps, &mut rng));
        }
    }
    table.dealer.has_finished = true;

    table.phase = GamePhase::Showdown;
    events.push(Event::PhaseChanged {
        table_id: table.id,
        phase: GamePhase::Showdown,
    });
    match settle_and_reset(table, deps, now) {
        Ok(settled) => events.extend(settled),
        Err(Error::BankUnderfunded {
            required,
            available,
        }) => {
            // The triggering action stands; the table parks at Showdown
            // with bets escrowed until a retry (see [`force_advance`])
            // finds the bank funded.
            tracing::warn!(
                table_id = table.id,
                required,
                available,
                "settlement deferred; bank cannot cover payouts"
            );
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

fn settle_and_reset(
    table: &mut Table,
    deps: &mut GameDeps,
    now: u64,
) -> Result<Vec<Event>, Error> {
    let mut events = settlement::settle(table, deps.ledger, deps.seals, now)?;
    reset_hand(table);
    table.last_activity = now;
    events.push(Event::PhaseChanged {
        table_id: table.id,
        phase: GamePhase::WaitingForPlayers,
    });
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, Signer};
    use holecard_types::{hand_total, Card, Seat};

    fn player(seed: u64) -> PublicKey {
        PrivateKey::from_seed(seed).public_key()
    }

    fn card(rank: u8, suit: u8) -> Card {
        Card { rank, suit }
    }

    fn seat_with(
        seals: &mut SealedCardStore,
        public: &PublicKey,
        stack: u64,
        bet: u64,
        cards: &[Card],
    ) -> Seat {
        let mut seat = Seat::new(public.clone(), stack);
        seat.current_bet = bet;
        seat.is_active = true;
        for &card in cards {
            seat.seals.push(seals.seal_card(card, Some(public)));
            seat.cards.push(card);
        }
        seat
    }

    #[test]
    fn test_hit_to_twenty_one_ends_turn() {
        let mut ledger = Ledger::new();
        ledger.credit_bank(10_000);
        let mut seals = SealedCardStore::new(&[5u8; 32]);
        let beacon = [2u8; 32];
        let first = player(1);
        let second = player(2);

        let mut table = Table::new(0, 1_000, 10_000, 0);
        table.status = TableStatus::Active;
        table.phase = GamePhase::PlayerTurns;
        table
            .seats
            .push(seat_with(&mut seals, &first, 4_000, 1_000, &[card(10, 0), card(6, 1)]));
        table
            .seats
            .push(seat_with(&mut seals, &second, 4_000, 1_000, &[card(9, 0), card(9, 1)]));
        // The ordered deck yields the 5 at index 3.
        table.deck.cursor = 3;

        let mut deps = GameDeps {
            ledger: &mut ledger,
            seals: &mut seals,
            beacon: &beacon,
        };
        let events = hit(&mut table, &mut deps, &first, 50).unwrap();

        // 10 + 6 + 5 = 21: the turn ends without an explicit stand.
        assert_eq!(hand_total(&table.seats[0].cards).0, 21);
        assert!(table.seats[0].has_acted);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::PlayerBusted { .. })));
        assert_eq!(scheduler::next_actor(&table), Some(&second));
        assert_eq!(table.phase, GamePhase::PlayerTurns);
    }

    #[test]
    fn test_underfunded_settlement_parks_table_until_retry() {
        let mut ledger = Ledger::new();
        let mut seals = SealedCardStore::new(&[5u8; 32]);
        let beacon = [2u8; 32];
        let actor = player(1);

        let mut table = Table::new(0, 1_000, 10_000, 0);
        table.status = TableStatus::Active;
        table.phase = GamePhase::PlayerTurns;
        table
            .seats
            .push(seat_with(&mut seals, &actor, 4_000, 1_000, &[card(10, 0), card(10, 1)]));
        table.dealer.cards = vec![card(10, 2), card(7, 3)];
        table.dealer.seals = vec![
            seals.seal_card(card(10, 2), None),
            seals.seal_card(card(7, 3), None),
        ];

        let mut deps = GameDeps {
            ledger: &mut ledger,
            seals: &mut seals,
            beacon: &beacon,
        };
        // An empty bank cannot cover the 2000 payout, but the stand is
        // still accepted; the table parks at Showdown with the bet
        // escrowed.
        let events = stand(&mut table, &mut deps, &actor, 100).unwrap();
        assert_eq!(table.phase, GamePhase::Showdown);
        assert!(table.dealer.has_finished);
        assert!(table.last_hand.is_none());
        assert_eq!(table.seats[0].table_stack, 4_000);
        assert_eq!(table.seats[0].current_bet, 1_000);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::PhaseChanged {
                phase: GamePhase::Showdown,
                ..
            }
        )));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::HandResultStored { .. })));

        // Retrying against the still-empty bank fails with nothing moved.
        let err = force_advance(&mut table, &mut deps, &actor, 160).unwrap_err();
        assert!(matches!(err, Error::BankUnderfunded { .. }));
        assert_eq!(table.phase, GamePhase::Showdown);
        assert_eq!(table.seats[0].current_bet, 1_000);

        // Once the bank is funded, anyone unsticks the table.
        deps.ledger.credit_bank(10_000);
        let events = force_advance(&mut table, &mut deps, &actor, 160).unwrap();
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::PayoutSent { amount: 2_000, .. })));
        assert_eq!(table.phase, GamePhase::WaitingForPlayers);
        assert_eq!(table.seats[0].table_stack, 6_000);
        assert_eq!(table.seats[0].current_bet, 0);
        assert_eq!(deps.ledger.bank(), 9_000);
        assert!(table.last_hand.is_some());
    }
}
