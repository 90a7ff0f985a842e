//! # Shared Crypto
//!
//! Cryptographic primitives used by the consensus core.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Message content and repeat hashes |
//! | `signatures` | Ed25519 | Server message signatures, identity structures |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Full signatures** carry the signer's public key so a verifier can
//!   match it against the key registered for the claimed identity

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{sha256, Sha256Hasher};
pub use signatures::{verify_signature, FullSignature, ServerKeyPair};
