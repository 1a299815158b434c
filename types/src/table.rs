use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use thiserror::Error as ThisError;

use crate::{Card, Deck, HandResult, SealedCard, MAX_HAND_SIZE, MAX_SEATS, MIN_BET_DIVISOR};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum TableInvariantError {
    #[error("seat count exceeds cap (got={got}, max={max})")]
    TooManySeats { got: usize, max: usize },
    #[error("seat {seat} card/seal sequences diverge (cards={cards}, seals={seals})")]
    CardSealMismatch {
        seat: usize,
        cards: usize,
        seals: usize,
    },
    #[error("actor occupies more than one seat")]
    DuplicateSeat,
    #[error("buy-in range inverted (min={min}, max={max})")]
    BuyInRangeInverted { min: u64, max: u64 },
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableStatus {
    Waiting = 0,
    Active = 1,
    Closed = 2,
}

impl TryFrom<u8> for TableStatus {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TableStatus::Waiting),
            1 => Ok(TableStatus::Active),
            2 => Ok(TableStatus::Closed),
            _ => Err(()),
        }
    }
}

impl Write for TableStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for TableStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        TableStatus::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for TableStatus {
    fn encode_size(&self) -> usize {
        1
    }
}

/// The five-phase per-hand lifecycle.
///
/// `Dealing`, `DealerTurn`, and `Showdown` resolve synchronously inside a
/// single call; only `WaitingForPlayers` and `PlayerTurns` persist between
/// calls.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    WaitingForPlayers = 0,
    Dealing = 1,
    PlayerTurns = 2,
    DealerTurn = 3,
    Showdown = 4,
}

impl TryFrom<u8> for GamePhase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GamePhase::WaitingForPlayers),
            1 => Ok(GamePhase::Dealing),
            2 => Ok(GamePhase::PlayerTurns),
            3 => Ok(GamePhase::DealerTurn),
            4 => Ok(GamePhase::Showdown),
            _ => Err(()),
        }
    }
}

impl Write for GamePhase {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GamePhase {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        GamePhase::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for GamePhase {
    fn encode_size(&self) -> usize {
        1
    }
}

/// One seated player. Owned by exactly one table while seated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seat {
    pub public: PublicKey,
    /// Chips at the table, disjoint from the wallet balance.
    pub table_stack: u64,
    /// Escrowed wager for the current hand (already debited from the stack).
    pub current_bet: u64,
    /// Clear cards, for deterministic outcome computation.
    pub cards: Vec<Card>,
    /// One sealed rank/suit pair per clear card, for private reveal.
    pub seals: Vec<SealedCard>,
    /// Still in the current hand.
    pub is_active: bool,
    /// Turn completed for the current hand.
    pub has_acted: bool,
}

impl Seat {
    pub fn new(public: PublicKey, table_stack: u64) -> Self {
        Self {
            public,
            table_stack,
            current_bet: 0,
            cards: Vec::new(),
            seals: Vec::new(),
            is_active: false,
            has_acted: false,
        }
    }

    /// Clear all per-hand state back to the baseline.
    pub fn reset_hand(&mut self) {
        self.current_bet = 0;
        self.cards.clear();
        self.seals.clear();
        self.is_active = false;
        self.has_acted = false;
    }
}

impl Write for Seat {
    fn write(&self, writer: &mut impl BufMut) {
        self.public.write(writer);
        self.table_stack.write(writer);
        self.current_bet.write(writer);
        self.cards.write(writer);
        self.seals.write(writer);
        self.is_active.write(writer);
        self.has_acted.write(writer);
    }
}

impl Read for Seat {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let public = PublicKey::read(reader)?;
        let table_stack = u64::read(reader)?;
        let current_bet = u64::read(reader)?;
        let cards = Vec::<Card>::read_range(reader, 0..=MAX_HAND_SIZE)?;
        let seals = Vec::<SealedCard>::read_range(reader, 0..=MAX_HAND_SIZE)?;
        if cards.len() != seals.len() {
            return Err(Error::Invalid("Seat", "card/seal length mismatch"));
        }
        Ok(Self {
            public,
            table_stack,
            current_bet,
            cards,
            seals,
            is_active: bool::read(reader)?,
            has_acted: bool::read(reader)?,
        })
    }
}

impl EncodeSize for Seat {
    fn encode_size(&self) -> usize {
        self.public.encode_size()
            + self.table_stack.encode_size()
            + self.current_bet.encode_size()
            + self.cards.encode_size()
            + self.seals.encode_size()
            + self.is_active.encode_size()
            + self.has_acted.encode_size()
    }
}

/// The dealer's hand. Same card/seal structure as a seat, minus chips.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DealerHand {
    pub cards: Vec<Card>,
    pub seals: Vec<SealedCard>,
    /// Set once the draw-to-17 loop completes.
    pub has_finished: bool,
}

impl DealerHand {
    pub fn reset_hand(&mut self) {
        self.cards.clear();
        self.seals.clear();
        self.has_finished = false;
    }
}

impl Write for DealerHand {
    fn write(&self, writer: &mut impl BufMut) {
        self.cards.write(writer);
        self.seals.write(writer);
        self.has_finished.write(writer);
    }
}

impl Read for DealerHand {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let cards = Vec::<Card>::read_range(reader, 0..=MAX_HAND_SIZE)?;
        let seals = Vec::<SealedCard>::read_range(reader, 0..=MAX_HAND_SIZE)?;
        if cards.len() != seals.len() {
            return Err(Error::Invalid("DealerHand", "card/seal length mismatch"));
        }
        Ok(Self {
            cards,
            seals,
            has_finished: bool::read(reader)?,
        })
    }
}

impl EncodeSize for DealerHand {
    fn encode_size(&self) -> usize {
        self.cards.encode_size() + self.seals.encode_size() + self.has_finished.encode_size()
    }
}

/// One blackjack table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub id: u64,
    pub status: TableStatus,
    pub min_buy_in: u64,
    pub max_buy_in: u64,
    pub deck: Deck,
    pub phase: GamePhase,
    /// Seated players, in seat order. Removal shift-compacts.
    pub seats: Vec<Seat>,
    pub dealer: DealerHand,
    /// Timestamp of the last accepted state change, for timeout forcing.
    pub last_activity: u64,
    /// Most recent completed hand, replaced wholesale each hand.
    pub last_hand: Option<HandResult>,
    /// Reserved by the schema for a cool-down between hands; no transition
    /// reads or writes it.
    pub next_hand_unlock_ts: u64,
}

impl Table {
    pub fn new(id: u64, min_buy_in: u64, max_buy_in: u64, now: u64) -> Self {
        Self {
            id,
            status: TableStatus::Waiting,
            min_buy_in,
            max_buy_in,
            deck: Deck::ordered(),
            phase: GamePhase::WaitingForPlayers,
            seats: Vec::new(),
            dealer: DealerHand::default(),
            last_activity: now,
            last_hand: None,
            next_hand_unlock_ts: 0,
        }
    }

    /// Smallest wager this table accepts.
    pub fn min_bet(&self) -> u64 {
        (self.min_buy_in / MIN_BET_DIVISOR).max(1)
    }

    pub fn seat_index(&self, public: &PublicKey) -> Option<usize> {
        self.seats.iter().position(|seat| seat.public == *public)
    }

    pub fn seat(&self, public: &PublicKey) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.public == *public)
    }

    /// A hand is in progress whenever any phase past betting is reached.
    pub fn hand_in_progress(&self) -> bool {
        self.phase != GamePhase::WaitingForPlayers
    }

    pub fn validate_invariants(&self) -> Result<(), TableInvariantError> {
        if self.max_buy_in < self.min_buy_in {
            return Err(TableInvariantError::BuyInRangeInverted {
                min: self.min_buy_in,
                max: self.max_buy_in,
            });
        }
        if self.seats.len() > MAX_SEATS {
            return Err(TableInvariantError::TooManySeats {
                got: self.seats.len(),
                max: MAX_SEATS,
            });
        }
        for (i, seat) in self.seats.iter().enumerate() {
            if seat.cards.len() != seat.seals.len() {
                return Err(TableInvariantError::CardSealMismatch {
                    seat: i,
                    cards: seat.cards.len(),
                    seals: seat.seals.len(),
                });
            }
            if self.seats[..i].iter().any(|other| other.public == seat.public) {
                return Err(TableInvariantError::DuplicateSeat);
            }
        }
        Ok(())
    }
}

impl Write for Table {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.status.write(writer);
        self.min_buy_in.write(writer);
        self.max_buy_in.write(writer);
        self.deck.write(writer);
        self.phase.write(writer);
        self.seats.write(writer);
        self.dealer.write(writer);
        self.last_activity.write(writer);
        self.last_hand.write(writer);
        self.next_hand_unlock_ts.write(writer);
    }
}

impl Read for Table {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let table = Self {
            id: u64::read(reader)?,
            status: TableStatus::read(reader)?,
            min_buy_in: u64::read(reader)?,
            max_buy_in: u64::read(reader)?,
            deck: Deck::read(reader)?,
            phase: GamePhase::read(reader)?,
            seats: Vec::<Seat>::read_range(reader, 0..=MAX_SEATS)?,
            dealer: DealerHand::read(reader)?,
            last_activity: u64::read(reader)?,
            last_hand: Option::<HandResult>::read(reader)?,
            next_hand_unlock_ts: u64::read(reader)?,
        };
        if table.validate_invariants().is_err() {
            return Err(Error::Invalid("Table", "invariant violation"));
        }
        Ok(table)
    }
}

impl EncodeSize for Table {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.status.encode_size()
            + self.min_buy_in.encode_size()
            + self.max_buy_in.encode_size()
            + self.deck.encode_size()
            + self.phase.encode_size()
            + self.seats.encode_size()
            + self.dealer.encode_size()
            + self.last_activity.encode_size()
            + self.last_hand.encode_size()
            + self.next_hand_unlock_ts.encode_size()
    }
}
