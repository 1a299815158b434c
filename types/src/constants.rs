/// Maximum number of tables the registry will create.
pub const MAX_TABLES: usize = 64;

/// Seats per table.
pub const MAX_SEATS: usize = 4;

/// Minimum seated players for a hand to run.
pub const MIN_PLAYERS: usize = 2;

/// Cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Maximum cards a blackjack hand can hold before busting is forced.
pub const MAX_HAND_SIZE: usize = 11;

/// Seconds of inactivity before anyone may force-advance a stalled turn.
pub const TURN_TIMEOUT_SECS: u64 = 60;

/// One-time promotional chip grant per actor.
pub const FREE_CHIP_GRANT: u64 = 1_000;

/// Chips minted per external funding unit (fixed conversion rate).
pub const CHIPS_PER_FUNDING_UNIT: u64 = 1_000;

/// Divisor applied to a table's minimum buy-in to derive its minimum bet.
pub const MIN_BET_DIVISOR: u64 = 10;
