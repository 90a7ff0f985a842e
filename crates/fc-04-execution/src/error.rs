//! Errors surfaced by the execution driver.

use crate::config::ConfigError;
use fc_02_messages::{ExecutionError, MessageError};
use fc_03_elections::ElectionError;
use shared_types::DecodeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// An integrity violation stopped the node; nothing executes until
    /// an operator resumes it.
    #[error("Node halted awaiting operator intervention")]
    Halted,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    #[error("Election error: {0}")]
    Election(#[from] ElectionError),

    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Failed to build validation workers: {0}")]
    WorkerPool(String),
}

impl ProcessorError {
    /// Whether the node must stop until an operator intervenes.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Halted => true,
            Self::Execution(err) => err.is_fatal(),
            _ => false,
        }
    }
}

pub type ProcessorResult<T> = Result<T, ProcessorError>;
