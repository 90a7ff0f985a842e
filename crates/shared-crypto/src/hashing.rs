//! # SHA-256 Hashing
//!
//! Every message hash in the core is a single SHA-256 over the canonical
//! byte form.

use sha2::{Digest, Sha256};
use shared_types::Hash;

/// Stateful SHA-256 hasher for multi-part inputs.
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}
