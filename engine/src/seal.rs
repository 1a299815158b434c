//! Sealed-card custody.
//!
//! Every dealt card is split into two independently sealed values (rank
//! and suit). The store keeps, per handle, a binding commitment
//! `sha256(domain || value || salt)` and the grantee list that an
//! off-engine custody service consults before releasing plaintext. The
//! engine only ever appends grantees; it never hands out values.

use std::collections::BTreeMap;

use commonware_cryptography::{
    ed25519::PublicKey,
    sha256::Sha256,
    Hasher,
};
use holecard_types::{Card, SealHandle, SealedCard, Viewer};
use rand::RngCore;
use rand_chacha::ChaCha20Rng;

use crate::rng;

/// Domain byte binding a commitment to a rank value.
const RANK_DOMAIN: u8 = 0x01;
/// Domain byte binding a commitment to a suit value.
const SUIT_DOMAIN: u8 = 0x02;

struct SealEntry {
    commitment: [u8; 32],
    grantees: Vec<Viewer>,
}

/// Store of sealed rank/suit values and their viewer ACLs.
pub struct SealedCardStore {
    next_handle: u64,
    entries: BTreeMap<u64, SealEntry>,
    salts: ChaCha20Rng,
}

impl SealedCardStore {
    /// `seed` stands in for the custody service's key material: salts must
    /// not be derivable from public inputs or the 52-value domain could be
    /// brute-forced against the commitments.
    pub fn new(seed: &[u8; 32]) -> Self {
        Self {
            next_handle: 0,
            entries: BTreeMap::new(),
            salts: rng::salt_rng(seed),
        }
    }

    fn seal_value(&mut self, domain: u8, value: u8, owner: Option<&PublicKey>) -> SealHandle {
        let mut salt = [0u8; 16];
        self.salts.fill_bytes(&mut salt);

        let mut hasher = Sha256::new();
        hasher.update(&[domain]);
        hasher.update(&[value]);
        hasher.update(&salt);
        let commitment = hasher.finalize().0;

        let mut grantees = vec![Viewer::Engine];
        if let Some(owner) = owner {
            grantees.push(Viewer::Actor(owner.clone()));
        }

        let handle = SealHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(handle.0, SealEntry { commitment, grantees });
        handle
    }

    /// Seal one card for its owner (`None` for the dealer). The owner and
    /// the engine are the initial grantees of both values.
    pub fn seal_card(&mut self, card: Card, owner: Option<&PublicKey>) -> SealedCard {
        SealedCard {
            rank: self.seal_value(RANK_DOMAIN, card.rank, owner),
            suit: self.seal_value(SUIT_DOMAIN, card.suit, owner),
        }
    }

    /// Append the wildcard grantee. Idempotent; unknown handles are a
    /// no-op (the handle space is engine-internal).
    pub fn reveal_public(&mut self, handle: SealHandle) {
        if let Some(entry) = self.entries.get_mut(&handle.0) {
            if !entry.grantees.contains(&Viewer::Public) {
                entry.grantees.push(Viewer::Public);
            }
        }
    }

    /// Mark both values of a sealed card publicly viewable.
    pub fn reveal_card_public(&mut self, sealed: &SealedCard) {
        self.reveal_public(sealed.rank);
        self.reveal_public(sealed.suit);
    }

    /// Whether `actor` may resolve `handle` off-engine.
    pub fn can_view(&self, handle: SealHandle, actor: &PublicKey) -> bool {
        self.entries.get(&handle.0).is_some_and(|entry| {
            entry.grantees.iter().any(|viewer| match viewer {
                Viewer::Public => true,
                Viewer::Actor(public) => public == actor,
                Viewer::Engine => false,
            })
        })
    }

    /// Whether `handle` has been revealed to everyone.
    pub fn is_public(&self, handle: SealHandle) -> bool {
        self.entries
            .get(&handle.0)
            .is_some_and(|entry| entry.grantees.contains(&Viewer::Public))
    }

    /// The binding commitment for `handle`, if it exists.
    pub fn commitment(&self, handle: SealHandle) -> Option<&[u8; 32]> {
        self.entries.get(&handle.0).map(|entry| &entry.commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, Signer};

    fn store() -> SealedCardStore {
        SealedCardStore::new(&[42u8; 32])
    }

    fn player(seed: u64) -> PublicKey {
        PrivateKey::from_seed(seed).public_key()
    }

    #[test]
    fn test_seal_grants_owner_only() {
        let mut store = store();
        let owner = player(1);
        let other = player(2);
        let sealed = store.seal_card(Card { rank: 14, suit: 0 }, Some(&owner));

        assert!(store.can_view(sealed.rank, &owner));
        assert!(store.can_view(sealed.suit, &owner));
        assert!(!store.can_view(sealed.rank, &other));
        assert!(!store.is_public(sealed.rank));
    }

    #[test]
    fn test_dealer_seal_hidden_until_public() {
        let mut store = store();
        let viewer = player(1);
        let sealed = store.seal_card(Card { rank: 10, suit: 2 }, None);
        assert!(!store.can_view(sealed.rank, &viewer));

        store.reveal_card_public(&sealed);
        assert!(store.can_view(sealed.rank, &viewer));
        assert!(store.can_view(sealed.suit, &viewer));
        assert!(store.is_public(sealed.rank));

        // Idempotent.
        store.reveal_card_public(&sealed);
        assert!(store.is_public(sealed.suit));
    }

    #[test]
    fn test_handles_are_unique_and_commitments_salted() {
        let mut store = store();
        let card = Card { rank: 7, suit: 1 };
        let a = store.seal_card(card, None);
        let b = store.seal_card(card, None);
        assert_ne!(a.rank, b.rank);
        assert_ne!(a.suit, b.suit);
        // Same value, different salt, different commitment.
        assert_ne!(store.commitment(a.rank), store.commitment(b.rank));
    }
}
