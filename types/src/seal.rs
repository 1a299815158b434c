//! Sealed-value handles.
//!
//! A sealed value is an opaque reference to a hidden rank or suit. The
//! engine never decrypts anything: a handle resolves to plaintext only
//! through an off-engine service that honors the grantee list attached to
//! it. Revealing a value publicly is an ACL append (the wildcard viewer),
//! never a decryption.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

/// Opaque identifier for one sealed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SealHandle(pub u64);

impl Write for SealHandle {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for SealHandle {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(u64::read(reader)?))
    }
}

impl EncodeSize for SealHandle {
    fn encode_size(&self) -> usize {
        self.0.encode_size()
    }
}

/// A party allowed to resolve a sealed value off-engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Viewer {
    /// A specific actor (the card's owner).
    Actor(PublicKey),
    /// The engine itself, so dealer seals can later be promoted.
    Engine,
    /// Anyone. Added exactly once, at settlement, to dealer seals.
    Public,
}

impl Write for Viewer {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Viewer::Actor(public) => {
                0u8.write(writer);
                public.write(writer);
            }
            Viewer::Engine => 1u8.write(writer),
            Viewer::Public => 2u8.write(writer),
        }
    }
}

impl Read for Viewer {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        match tag {
            0 => Ok(Viewer::Actor(PublicKey::read(reader)?)),
            1 => Ok(Viewer::Engine),
            2 => Ok(Viewer::Public),
            _ => Err(Error::InvalidEnum(tag)),
        }
    }
}

impl EncodeSize for Viewer {
    fn encode_size(&self) -> usize {
        1 + match self {
            Viewer::Actor(public) => public.encode_size(),
            Viewer::Engine | Viewer::Public => 0,
        }
    }
}

/// The sealed rank/suit handle pair for one dealt card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SealedCard {
    pub rank: SealHandle,
    pub suit: SealHandle,
}

impl Write for SealedCard {
    fn write(&self, writer: &mut impl BufMut) {
        self.rank.write(writer);
        self.suit.write(writer);
    }
}

impl Read for SealedCard {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            rank: SealHandle::read(reader)?,
            suit: SealHandle::read(reader)?,
        })
    }
}

impl EncodeSize for SealedCard {
    fn encode_size(&self) -> usize {
        self.rank.encode_size() + self.suit.encode_size()
    }
}
