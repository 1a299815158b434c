//! Seed derivation for deck shuffles and sealing salts.
//!
//! Seeds are sha256 digests of public inputs with a domain-separator
//! prefix, stretched through ChaCha20. Reproducible by anyone holding the
//! inputs; a participant who sees the beacon before acting can predict
//! the shuffle, which is an accepted property of this pipeline.

use commonware_codec::Encode;
use commonware_cryptography::{
    ed25519::PublicKey,
    sha256::Sha256,
    Hasher,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Derive the rng that orders a table's deck for one operation.
pub fn deck_rng(beacon: &[u8; 32], caller: &PublicKey, table_id: u64, now: u64) -> ChaCha20Rng {
    let mut hasher = Sha256::new();
    hasher.update(b"shuffle"); // Domain separator
    hasher.update(beacon);
    hasher.update(caller.encode().as_ref());
    hasher.update(&table_id.to_be_bytes());
    hasher.update(&now.to_be_bytes());
    ChaCha20Rng::from_seed(hasher.finalize().0)
}

/// Derive the store-private salt stream for sealed-value commitments.
pub fn salt_rng(seed: &[u8; 32]) -> ChaCha20Rng {
    let mut hasher = Sha256::new();
    hasher.update(b"seal_salt"); // Domain separator
    hasher.update(seed);
    ChaCha20Rng::from_seed(hasher.finalize().0)
}
