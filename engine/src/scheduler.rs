//! Turn order.
//!
//! The on-turn seat is derived, never stored: during `PlayerTurns` it is
//! the first seat in seat order that is still in the hand and has not
//! acted. At most one seat can be on turn at a time by construction.

use commonware_cryptography::ed25519::PublicKey;
use holecard_types::{GamePhase, Table, TURN_TIMEOUT_SECS};

use crate::Error;

/// Index of the on-turn seat, if any.
pub fn on_turn_index(table: &Table) -> Option<usize> {
    if table.phase != GamePhase::PlayerTurns {
        return None;
    }
    table
        .seats
        .iter()
        .position(|seat| seat.is_active && !seat.has_acted)
}

/// Whether it is `actor`'s turn to act.
pub fn is_turn(table: &Table, actor: &PublicKey) -> bool {
    on_turn_index(table).is_some_and(|index| table.seats[index].public == *actor)
}

/// The on-turn actor, if any.
pub fn next_actor(table: &Table) -> Option<&PublicKey> {
    on_turn_index(table).map(|index| &table.seats[index].public)
}

/// Reject unless the phase is `PlayerTurns` and `actor` is on turn.
/// Returns the actor's seat index.
pub fn ensure_turn(table: &Table, actor: &PublicKey) -> Result<usize, Error> {
    if table.phase != GamePhase::PlayerTurns {
        return Err(Error::NotPlayerPhase);
    }
    let index = on_turn_index(table).ok_or(Error::NotYourTurn)?;
    if table.seats[index].public != *actor {
        return Err(Error::NotYourTurn);
    }
    Ok(index)
}

/// Reject unless the liveness timeout has elapsed since the table's last
/// accepted state change.
pub fn ensure_timeout_elapsed(table: &Table, now: u64) -> Result<(), Error> {
    let deadline = table.last_activity.saturating_add(TURN_TIMEOUT_SECS);
    if now < deadline {
        return Err(Error::TimeoutNotElapsed {
            remaining: deadline - now,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, Signer};
    use holecard_types::Seat;

    fn player(seed: u64) -> PublicKey {
        PrivateKey::from_seed(seed).public_key()
    }

    fn turns_table() -> Table {
        let mut table = Table::new(0, 1_000, 10_000, 0);
        table.phase = GamePhase::PlayerTurns;
        for seed in 1..=3 {
            let mut seat = Seat::new(player(seed), 5_000);
            seat.is_active = true;
            table.seats.push(seat);
        }
        table
    }

    #[test]
    fn test_on_turn_is_first_unacted_active_seat() {
        let mut table = turns_table();
        assert_eq!(on_turn_index(&table), Some(0));
        assert!(is_turn(&table, &player(1)));
        assert!(!is_turn(&table, &player(2)));

        table.seats[0].has_acted = true;
        assert_eq!(on_turn_index(&table), Some(1));

        // Folded-out seats are skipped.
        table.seats[1].is_active = false;
        assert_eq!(on_turn_index(&table), Some(2));
        assert_eq!(next_actor(&table), Some(&player(3)));

        table.seats[2].has_acted = true;
        assert_eq!(on_turn_index(&table), None);
        assert_eq!(next_actor(&table), None);
    }

    #[test]
    fn test_no_turn_outside_player_phase() {
        let mut table = turns_table();
        table.phase = GamePhase::WaitingForPlayers;
        assert_eq!(on_turn_index(&table), None);
        assert_eq!(ensure_turn(&table, &player(1)), Err(Error::NotPlayerPhase));
    }

    #[test]
    fn test_ensure_turn_rejects_out_of_order_actor() {
        let table = turns_table();
        assert_eq!(ensure_turn(&table, &player(1)), Ok(0));
        assert_eq!(ensure_turn(&table, &player(2)), Err(Error::NotYourTurn));
    }

    #[test]
    fn test_timeout_boundary() {
        let mut table = turns_table();
        table.last_activity = 100;
        assert_eq!(
            ensure_timeout_elapsed(&table, 159),
            Err(Error::TimeoutNotElapsed { remaining: 1 })
        );
        assert_eq!(ensure_timeout_elapsed(&table, 160), Ok(()));
        assert_eq!(ensure_timeout_elapsed(&table, 200), Ok(()));
    }
}
