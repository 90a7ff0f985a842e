//! Write-once caches carried by each message instance.

use shared_types::Hash;
use std::sync::OnceLock;

/// Memoized content hash, message hash and signature outcome.
///
/// Each slot is written at most once and then only read, so a message can
/// be shared between lanes without further locking. Anything that changes
/// the bytes a slot was derived from must call [`MessageCache::clear`].
///
/// Caches never take part in equality, and a clone starts empty because
/// its fields may be edited independently of the original.
#[derive(Debug, Default)]
pub struct MessageCache {
    hash: OnceLock<Hash>,
    msg_hash: OnceLock<Hash>,
    sig_valid: OnceLock<bool>,
}

impl MessageCache {
    pub fn hash_or_init(&self, compute: impl FnOnce() -> Hash) -> Hash {
        *self.hash.get_or_init(compute)
    }

    pub fn msg_hash_or_init(&self, compute: impl FnOnce() -> Hash) -> Hash {
        *self.msg_hash.get_or_init(compute)
    }

    pub fn sig_valid(&self) -> Option<bool> {
        self.sig_valid.get().copied()
    }

    /// Store the verification outcome. A concurrent first writer wins.
    pub fn record_sig_valid(&self, valid: bool) -> bool {
        *self.sig_valid.get_or_init(|| valid)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Clone for MessageCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for MessageCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for MessageCache {}
