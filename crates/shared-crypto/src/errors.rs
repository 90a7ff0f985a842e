//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Public key bytes are not a valid curve point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature was produced by a different key than the one required
    #[error("Signer key does not match the expected key")]
    SignerMismatch,
}
