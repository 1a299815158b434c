use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use crate::{Card, SealedCard, MAX_HAND_SIZE, MAX_SEATS};

/// How a player's hand resolved against the dealer.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Lose = 0,
    Win = 1,
    Push = 2,
    Blackjack = 3,
}

impl TryFrom<u8> for Outcome {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::Lose),
            1 => Ok(Outcome::Win),
            2 => Ok(Outcome::Push),
            3 => Ok(Outcome::Blackjack),
            _ => Err(()),
        }
    }
}

impl Write for Outcome {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Outcome {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Outcome::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for Outcome {
    fn encode_size(&self) -> usize {
        1
    }
}

/// One player's line in a completed hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerResult {
    pub player: PublicKey,
    pub bet: u64,
    pub total: u8,
    pub outcome: Outcome,
    /// Chips credited back to the stack (0 on a loss, bet on a push).
    pub payout: u64,
    /// The player's cards, public once the hand is final.
    pub cards: Vec<Card>,
}

impl Write for PlayerResult {
    fn write(&self, writer: &mut impl BufMut) {
        self.player.write(writer);
        self.bet.write(writer);
        self.total.write(writer);
        self.outcome.write(writer);
        self.payout.write(writer);
        self.cards.write(writer);
    }
}

impl Read for PlayerResult {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            player: PublicKey::read(reader)?,
            bet: u64::read(reader)?,
            total: u8::read(reader)?,
            outcome: Outcome::read(reader)?,
            payout: u64::read(reader)?,
            cards: Vec::<Card>::read_range(reader, 0..=MAX_HAND_SIZE)?,
        })
    }
}

impl EncodeSize for PlayerResult {
    fn encode_size(&self) -> usize {
        self.player.encode_size()
            + self.bet.encode_size()
            + self.total.encode_size()
            + self.outcome.encode_size()
            + self.payout.encode_size()
            + self.cards.encode_size()
    }
}

/// Snapshot of the most recently completed hand at a table.
///
/// Built and stored before the table resets, so observers can always ask
/// "what just happened" even though the table is already taking bets again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandResult {
    pub dealer_cards: Vec<Card>,
    pub dealer_total: u8,
    pub dealer_busted: bool,
    pub results: Vec<PlayerResult>,
    /// Sum of all active bets, credited to the bank before payouts.
    pub pot: u64,
    pub timestamp: u64,
    /// Dealer seal handles, re-marked publicly revealable at settlement.
    pub dealer_seals: Vec<SealedCard>,
}

impl Write for HandResult {
    fn write(&self, writer: &mut impl BufMut) {
        self.dealer_cards.write(writer);
        self.dealer_total.write(writer);
        self.dealer_busted.write(writer);
        self.results.write(writer);
        self.pot.write(writer);
        self.timestamp.write(writer);
        self.dealer_seals.write(writer);
    }
}

impl Read for HandResult {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let dealer_cards = Vec::<Card>::read_range(reader, 0..=MAX_HAND_SIZE)?;
        let dealer_total = u8::read(reader)?;
        let dealer_busted = bool::read(reader)?;
        let results = Vec::<PlayerResult>::read_range(reader, 0..=MAX_SEATS)?;
        let pot = u64::read(reader)?;
        let timestamp = u64::read(reader)?;
        let dealer_seals = Vec::<SealedCard>::read_range(reader, 0..=MAX_HAND_SIZE)?;
        if dealer_seals.len() != dealer_cards.len() {
            return Err(Error::Invalid("HandResult", "dealer card/seal mismatch"));
        }
        Ok(Self {
            dealer_cards,
            dealer_total,
            dealer_busted,
            results,
            pot,
            timestamp,
            dealer_seals,
        })
    }
}

impl EncodeSize for HandResult {
    fn encode_size(&self) -> usize {
        self.dealer_cards.encode_size()
            + self.dealer_total.encode_size()
            + self.dealer_busted.encode_size()
            + self.results.encode_size()
            + self.pot.encode_size()
            + self.timestamp.encode_size()
            + self.dealer_seals.encode_size()
    }
}
