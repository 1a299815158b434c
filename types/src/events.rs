//! Notification events.
//!
//! Fire-and-forget notices emitted by every state-mutating engine
//! operation. External collaborators (presentation layer, off-engine
//! decryption flow, archival) subscribe to these; the engine never depends
//! on their availability. Card identities never appear here — a dealt card
//! is announced by its sealed handles only.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use crate::{GamePhase, Outcome, SealedCard, MAX_SEATS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    // Registry events (tags 0-4)
    TableCreated {
        table_id: u64,
        creator: PublicKey,
        min_buy_in: u64,
        max_buy_in: u64,
    },
    TableJoined {
        table_id: u64,
        player: PublicKey,
        buy_in: u64,
    },
    TableLeft {
        table_id: u64,
        player: PublicKey,
        returned_to_wallet: u64,
        forfeited: u64,
    },
    GameStarted {
        table_id: u64,
    },
    HandStarted {
        table_id: u64,
        players: Vec<PublicKey>,
    },

    // Gameplay events (tags 10-17)
    BetPlaced {
        table_id: u64,
        player: PublicKey,
        amount: u64,
    },
    CardDealt {
        table_id: u64,
        /// `None` when the card went to the dealer.
        recipient: Option<PublicKey>,
        seal: SealedCard,
    },
    PlayerHit {
        table_id: u64,
        player: PublicKey,
    },
    PlayerStood {
        table_id: u64,
        player: PublicKey,
    },
    PlayerDoubled {
        table_id: u64,
        player: PublicKey,
        new_bet: u64,
    },
    PlayerBusted {
        table_id: u64,
        player: PublicKey,
    },
    PhaseChanged {
        table_id: u64,
        phase: GamePhase,
    },
    TurnForced {
        table_id: u64,
        /// The stalled player whose turn was auto-resolved, if any.
        player: Option<PublicKey>,
    },

    // Settlement events (tags 20-22)
    WinnerDetermined {
        table_id: u64,
        player: PublicKey,
        outcome: Outcome,
        payout: u64,
    },
    PayoutSent {
        table_id: u64,
        player: PublicKey,
        amount: u64,
    },
    HandResultStored {
        table_id: u64,
        pot: u64,
        timestamp: u64,
    },

    // Economy events (tags 30-34)
    FreeChipsClaimed {
        player: PublicKey,
        amount: u64,
    },
    ChipsPurchased {
        player: PublicKey,
        chips: u64,
    },
    ChipsWithdrawn {
        player: PublicKey,
        chips: u64,
    },
    BankFunded {
        amount: u64,
    },
    BankDefunded {
        amount: u64,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Event::TableCreated {
                table_id,
                creator,
                min_buy_in,
                max_buy_in,
            } => {
                0u8.write(writer);
                table_id.write(writer);
                creator.write(writer);
                min_buy_in.write(writer);
                max_buy_in.write(writer);
            }
            Event::TableJoined {
                table_id,
                player,
                buy_in,
            } => {
                1u8.write(writer);
                table_id.write(writer);
                player.write(writer);
                buy_in.write(writer);
            }
            Event::TableLeft {
                table_id,
                player,
                returned_to_wallet,
                forfeited,
            } => {
                2u8.write(writer);
                table_id.write(writer);
                player.write(writer);
                returned_to_wallet.write(writer);
                forfeited.write(writer);
            }
            Event::GameStarted { table_id } => {
                3u8.write(writer);
                table_id.write(writer);
            }
            Event::HandStarted { table_id, players } => {
                4u8.write(writer);
                table_id.write(writer);
                players.write(writer);
            }
            Event::BetPlaced {
                table_id,
                player,
                amount,
            } => {
                10u8.write(writer);
                table_id.write(writer);
                player.write(writer);
                amount.write(writer);
            }
            Event::CardDealt {
                table_id,
                recipient,
                seal,
            } => {
                11u8.write(writer);
                table_id.write(writer);
                recipient.write(writer);
                seal.write(writer);
            }
            Event::PlayerHit { table_id, player } => {
                12u8.write(writer);
                table_id.write(writer);
                player.write(writer);
            }
            Event::PlayerStood { table_id, player } => {
                13u8.write(writer);
                table_id.write(writer);
                player.write(writer);
            }
            Event::PlayerDoubled {
                table_id,
                player,
                new_bet,
            } => {
                14u8.write(writer);
                table_id.write(writer);
                player.write(writer);
                new_bet.write(writer);
            }
            Event::PlayerBusted { table_id, player } => {
                15u8.write(writer);
                table_id.write(writer);
                player.write(writer);
            }
            Event::PhaseChanged { table_id, phase } => {
                16u8.write(writer);
                table_id.write(writer);
                phase.write(writer);
            }
            Event::TurnForced { table_id, player } => {
                17u8.write(writer);
                table_id.write(writer);
                player.write(writer);
            }
            Event::WinnerDetermined {
                table_id,
                player,
                outcome,
                payout,
            } => {
                20u8.write(writer);
                table_id.write(writer);
                player.write(writer);
                outcome.write(writer);
                payout.write(writer);
            }
            Event::PayoutSent {
                table_id,
                player,
                amount,
            } => {
                21u8.write(writer);
                table_id.write(writer);
                player.write(writer);
                amount.write(writer);
            }
            Event::HandResultStored {
                table_id,
                pot,
                timestamp,
            } => {
                22u8.write(writer);
                table_id.write(writer);
                pot.write(writer);
                timestamp.write(writer);
            }
            Event::FreeChipsClaimed { player, amount } => {
                30u8.write(writer);
                player.write(writer);
                amount.write(writer);
            }
            Event::ChipsPurchased { player, chips } => {
                31u8.write(writer);
                player.write(writer);
                chips.write(writer);
            }
            Event::ChipsWithdrawn { player, chips } => {
                32u8.write(writer);
                player.write(writer);
                chips.write(writer);
            }
            Event::BankFunded { amount } => {
                33u8.write(writer);
                amount.write(writer);
            }
            Event::BankDefunded { amount } => {
                34u8.write(writer);
                amount.write(writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        match tag {
            0 => Ok(Event::TableCreated {
                table_id: u64::read(reader)?,
                creator: PublicKey::read(reader)?,
                min_buy_in: u64::read(reader)?,
                max_buy_in: u64::read(reader)?,
            }),
            1 => Ok(Event::TableJoined {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                buy_in: u64::read(reader)?,
            }),
            2 => Ok(Event::TableLeft {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                returned_to_wallet: u64::read(reader)?,
                forfeited: u64::read(reader)?,
            }),
            3 => Ok(Event::GameStarted {
                table_id: u64::read(reader)?,
            }),
            4 => Ok(Event::HandStarted {
                table_id: u64::read(reader)?,
                players: Vec::<PublicKey>::read_range(reader, 0..=MAX_SEATS)?,
            }),
            10 => Ok(Event::BetPlaced {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            }),
            11 => Ok(Event::CardDealt {
                table_id: u64::read(reader)?,
                recipient: Option::<PublicKey>::read(reader)?,
                seal: SealedCard::read(reader)?,
            }),
            12 => Ok(Event::PlayerHit {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
            }),
            13 => Ok(Event::PlayerStood {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
            }),
            14 => Ok(Event::PlayerDoubled {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                new_bet: u64::read(reader)?,
            }),
            15 => Ok(Event::PlayerBusted {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
            }),
            16 => Ok(Event::PhaseChanged {
                table_id: u64::read(reader)?,
                phase: GamePhase::read(reader)?,
            }),
            17 => Ok(Event::TurnForced {
                table_id: u64::read(reader)?,
                player: Option::<PublicKey>::read(reader)?,
            }),
            20 => Ok(Event::WinnerDetermined {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                outcome: Outcome::read(reader)?,
                payout: u64::read(reader)?,
            }),
            21 => Ok(Event::PayoutSent {
                table_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            }),
            22 => Ok(Event::HandResultStored {
                table_id: u64::read(reader)?,
                pot: u64::read(reader)?,
                timestamp: u64::read(reader)?,
            }),
            30 => Ok(Event::FreeChipsClaimed {
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            }),
            31 => Ok(Event::ChipsPurchased {
                player: PublicKey::read(reader)?,
                chips: u64::read(reader)?,
            }),
            32 => Ok(Event::ChipsWithdrawn {
                player: PublicKey::read(reader)?,
                chips: u64::read(reader)?,
            }),
            33 => Ok(Event::BankFunded {
                amount: u64::read(reader)?,
            }),
            34 => Ok(Event::BankDefunded {
                amount: u64::read(reader)?,
            }),
            _ => Err(Error::InvalidEnum(tag)),
        }
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        1 + match self {
            Event::TableCreated {
                table_id,
                creator,
                min_buy_in,
                max_buy_in,
            } => {
                table_id.encode_size()
                    + creator.encode_size()
                    + min_buy_in.encode_size()
                    + max_buy_in.encode_size()
            }
            Event::TableJoined {
                table_id,
                player,
                buy_in,
            } => table_id.encode_size() + player.encode_size() + buy_in.encode_size(),
            Event::TableLeft {
                table_id,
                player,
                returned_to_wallet,
                forfeited,
            } => {
                table_id.encode_size()
                    + player.encode_size()
                    + returned_to_wallet.encode_size()
                    + forfeited.encode_size()
            }
            Event::GameStarted { table_id } => table_id.encode_size(),
            Event::HandStarted { table_id, players } => {
                table_id.encode_size() + players.encode_size()
            }
            Event::BetPlaced {
                table_id,
                player,
                amount,
            } => table_id.encode_size() + player.encode_size() + amount.encode_size(),
            Event::CardDealt {
                table_id,
                recipient,
                seal,
            } => table_id.encode_size() + recipient.encode_size() + seal.encode_size(),
            Event::PlayerHit { table_id, player }
            | Event::PlayerStood { table_id, player }
            | Event::PlayerBusted { table_id, player } => {
                table_id.encode_size() + player.encode_size()
            }
            Event::PlayerDoubled {
                table_id,
                player,
                new_bet,
            } => table_id.encode_size() + player.encode_size() + new_bet.encode_size(),
            Event::PhaseChanged { table_id, phase } => {
                table_id.encode_size() + phase.encode_size()
            }
            Event::TurnForced { table_id, player } => {
                table_id.encode_size() + player.encode_size()
            }
            Event::WinnerDetermined {
                table_id,
                player,
                outcome,
                payout,
            } => {
                table_id.encode_size()
                    + player.encode_size()
                    + outcome.encode_size()
                    + payout.encode_size()
            }
            Event::PayoutSent {
                table_id,
                player,
                amount,
            } => table_id.encode_size() + player.encode_size() + amount.encode_size(),
            Event::HandResultStored {
                table_id,
                pot,
                timestamp,
            } => table_id.encode_size() + pot.encode_size() + timestamp.encode_size(),
            Event::FreeChipsClaimed { player, amount } => {
                player.encode_size() + amount.encode_size()
            }
            Event::ChipsPurchased { player, chips }
            | Event::ChipsWithdrawn { player, chips } => {
                player.encode_size() + chips.encode_size()
            }
            Event::BankFunded { amount } | Event::BankDefunded { amount } => amount.encode_size(),
        }
    }
}
