//! Error types for the election adapter.

use fc_02_messages::MessageType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    /// Only election-internal messages drive the adapter.
    #[error("Not an election message: {0}")]
    NotElectionMessage(MessageType),

    /// Elections need at least one lane.
    #[error("No federated servers in the registry")]
    NoFederatedServers,

    #[error("Minutes per block must be greater than zero")]
    ZeroMinutesPerBlock,
}

pub type ElectionResult<T> = Result<T, ElectionError>;
