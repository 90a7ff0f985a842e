//! Error types for the identity registry.

use shared_crypto::CryptoError;
use shared_types::ChainId;
use thiserror::Error;

/// Registry error types.
///
/// None of these are fatal to the node; they are returned to whichever
/// lane or tool invoked the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Identity not found: {0}")]
    IdentityNotFound(ChainId),

    #[error("Authority not found: {0}")]
    AuthorityNotFound(ChainId),

    /// Target of a key-management structure is not registered.
    #[error("ChainID does not exist: {0}")]
    ChainDoesNotExist(ChainId),

    /// Registration for an identity that is already known.
    #[error("ChainID already exists: {0}")]
    ChainAlreadyExists(ChainId),

    #[error("No signing key installed for identity {0}")]
    MissingSigningKey(ChainId),

    #[error("Structure signature rejected: {0}")]
    Signature(#[from] CryptoError),

    #[error("Invalid authority status byte: {0}")]
    InvalidStatus(u8),

    #[error("Snapshot encoding failed: {0}")]
    Snapshot(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
