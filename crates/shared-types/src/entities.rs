//! # Core Entities
//!
//! Identifiers and time values shared by every subsystem.
//!
//! ## Wire sizes
//!
//! | Type | Bytes |
//! |------|-------|
//! | `Hash` / `ChainId` | 32 |
//! | `PublicKey` | 32 |
//! | `Signature` | 64 |
//! | `Timestamp` | 6 (low 48 bits of the millisecond count) |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// The all-zero hash.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Identifier of an identity, authority or ledger chain.
///
/// Ordering is lexicographic over the raw bytes, which is the order every
/// node uses when it needs a deterministic tie-break between servers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ChainId(pub Hash);

impl ChainId {
    /// Number of bytes on the wire.
    pub const LEN: usize = 32;

    pub const fn new(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// An unset chain ID is all zeroes.
    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_HASH
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let hash: Hash = bytes.try_into().ok()?;
        Some(Self(hash))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<Hash> for ChainId {
    fn from(bytes: Hash) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", &self.to_hex()[..12])
    }
}

/// Millisecond-resolution timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Number of bytes on the wire.
    pub const LEN: usize = 6;

    /// Largest value representable in the 48-bit wire form.
    pub const MAX_MILLIS: u64 = (1 << 48) - 1;

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(millis as u64)
    }

    pub fn millis(&self) -> u64 {
        self.0
    }

    pub fn secs(&self) -> u64 {
        self.0 / 1000
    }

    /// Encode as six big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 6] {
        let full = (self.0 & Self::MAX_MILLIS).to_be_bytes();
        let mut out = [0u8; 6];
        out.copy_from_slice(&full[2..]);
        out
    }

    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        let mut full = [0u8; 8];
        full[2..].copy_from_slice(&bytes);
        Self(u64::from_be_bytes(full))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
