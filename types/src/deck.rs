use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use thiserror::Error as ThisError;

use crate::DECK_SIZE;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum DeckInvariantError {
    #[error("cursor out of range (got={got}, max={max})")]
    CursorOutOfRange { got: u8, max: u8 },
    #[error("order is not a permutation of 0..52 (duplicate or missing index {index})")]
    NotAPermutation { index: u8 },
}

/// A 52-entry permutation over the canonical card indices plus a draw
/// cursor. The permutation is replaced wholesale on every shuffle; the
/// cursor only ever moves forward until the next shuffle resets it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    /// Permutation of `0..=51`.
    pub order: [u8; DECK_SIZE],
    /// Index of the next card to draw; `cursor == 52` means exhausted.
    pub cursor: u8,
}

impl Default for Deck {
    fn default() -> Self {
        Self::ordered()
    }
}

impl Deck {
    /// The identity permutation with the cursor at the top.
    pub fn ordered() -> Self {
        let mut order = [0u8; DECK_SIZE];
        for (i, slot) in order.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self { order, cursor: 0 }
    }

    /// Replace the permutation and reset the cursor.
    pub fn reset_with(&mut self, order: [u8; DECK_SIZE]) {
        self.order = order;
        self.cursor = 0;
    }

    /// Cards left before a reshuffle is required.
    pub fn remaining(&self) -> usize {
        DECK_SIZE.saturating_sub(self.cursor as usize)
    }

    /// Take the next card index, advancing the cursor. `None` once
    /// exhausted; the caller decides when to reshuffle.
    pub fn next(&mut self) -> Option<u8> {
        if self.remaining() == 0 {
            return None;
        }
        let card = self.order[self.cursor as usize];
        self.cursor += 1;
        Some(card)
    }

    pub fn validate_invariants(&self) -> Result<(), DeckInvariantError> {
        if self.cursor as usize > DECK_SIZE {
            return Err(DeckInvariantError::CursorOutOfRange {
                got: self.cursor,
                max: DECK_SIZE as u8,
            });
        }
        let mut seen = [false; DECK_SIZE];
        for &index in &self.order {
            if index as usize >= DECK_SIZE || seen[index as usize] {
                return Err(DeckInvariantError::NotAPermutation { index });
            }
            seen[index as usize] = true;
        }
        Ok(())
    }
}

impl Write for Deck {
    fn write(&self, writer: &mut impl BufMut) {
        writer.put_slice(&self.order);
        self.cursor.write(writer);
    }
}

impl Read for Deck {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < DECK_SIZE {
            return Err(Error::EndOfBuffer);
        }
        let mut order = [0u8; DECK_SIZE];
        reader.copy_to_slice(&mut order);
        let deck = Self {
            order,
            cursor: u8::read(reader)?,
        };
        if deck.validate_invariants().is_err() {
            return Err(Error::Invalid("Deck", "invalid permutation or cursor"));
        }
        Ok(deck)
    }
}

impl EncodeSize for Deck {
    fn encode_size(&self) -> usize {
        DECK_SIZE + self.cursor.encode_size()
    }
}
