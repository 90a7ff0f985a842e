//! Error types for the message layer.

use fc_01_identity_registry::RegistryError;
use shared_types::{ChainId, DecodeError};
use thiserror::Error;

/// Errors from building, signing or verifying a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// A field required for signing is unset.
    #[error("Message is incomplete: {0} is not set")]
    Incomplete(&'static str),

    #[error("Registry lookup failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Errors raised while executing a validated message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Another server is using the local identity with the wrong secret.
    /// The only unrecoverable condition in the core.
    #[error("Integrity violation: local identity {chain_id} impersonated")]
    IntegrityViolation { chain_id: ChainId },

    #[error("Missing-message replay failed: {0}")]
    Replay(String),
}

impl ExecutionError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::IntegrityViolation { .. })
    }
}
