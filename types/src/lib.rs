//! Holecard domain types.
//!
//! Defines the table/seat/card state model, sealed-value handles, hand
//! results, notification events, and constants shared by the engine and
//! its clients. Everything that can be persisted or broadcast carries a
//! `commonware-codec` implementation.

mod card;
mod constants;
mod deck;
mod events;
mod result;
mod seal;
mod table;

pub use card::*;
pub use constants::*;
pub use deck::*;
pub use events::*;
pub use result::*;
pub use seal::*;
pub use table::*;
