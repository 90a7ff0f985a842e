use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// A directory block does not link to the one below it.
    #[error("KeyMR mismatch at height {height}")]
    KeyMrMismatch { height: u32 },

    #[error("Block store failure: {0}")]
    Store(String),
}

pub type ReplayResult<T> = Result<T, ReplayError>;
