//! Deterministic multi-table blackjack engine.
//!
//! The [`Casino`] facade owns every table, the shared chip ledger, and the
//! sealed-card store. All mutating entry points are serialized by the
//! caller, take explicit timestamps (no wall clock inside the engine), and
//! return the notification events they produced. Randomness is derived
//! from hashed public inputs, so replaying the same calls yields the same
//! tables, cards, and payouts.

mod casino;
mod deck;
mod error;
mod game;
mod ledger;
mod rng;
mod scheduler;
mod seal;
mod settlement;

pub use casino::{Casino, DealerView, SeatView, TableSnapshot};
pub use error::Error;
pub use seal::SealedCardStore;

#[cfg(test)]
mod ledger_integration_tests;
