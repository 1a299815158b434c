use thiserror::Error as ThisError;

/// Engine error taxonomy. Every failed operation leaves all state
/// untouched.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum Error {
    // State errors
    #[error("table {0} does not exist")]
    TableNotFound(u64),
    #[error("table limit reached")]
    TableLimitReached,
    #[error("buy-in range inverted (min={min}, max={max})")]
    InvalidBuyInRange { min: u64, max: u64 },
    #[error("table is full")]
    TableFull,
    #[error("actor already seated at a table")]
    AlreadySeated,
    #[error("actor is not seated at this table")]
    NotSeated,
    #[error("a hand is in progress")]
    HandInProgress,
    #[error("no betting round is open")]
    NotBettingPhase,
    #[error("not the player-turns phase")]
    NotPlayerPhase,
    #[error("not this actor's turn")]
    NotYourTurn,
    #[error("bet already placed for this hand")]
    BetAlreadyPlaced,
    #[error("double down requires exactly two cards and no prior action")]
    CannotDouble,

    // Funds errors
    #[error("amount must be non-zero")]
    ZeroAmount,
    #[error("amount is not a whole number of funding units")]
    NotConvertible,
    #[error("insufficient funds (required={required}, available={available})")]
    InsufficientFunds { required: u64, available: u64 },
    #[error("buy-in outside table range (min={min}, max={max}, got={got})")]
    BuyInOutOfRange { min: u64, max: u64, got: u64 },
    #[error("bet outside allowed range (min={min}, max={max}, got={got})")]
    BetOutOfRange { min: u64, max: u64, got: u64 },
    #[error("bank cannot cover payouts (required={required}, available={available})")]
    BankUnderfunded { required: u64, available: u64 },
    #[error("free chips already claimed")]
    AlreadyClaimed,

    // Admin errors
    #[error("caller is not the owner")]
    NotOwner,
    #[error("engine is paused")]
    Paused,
    #[error("transfer already in progress")]
    ReentrantTransfer,

    // Liveness errors
    #[error("turn timeout not elapsed ({remaining}s remaining)")]
    TimeoutNotElapsed { remaining: u64 },
    #[error("nothing to force-advance")]
    NothingToAdvance,
}
