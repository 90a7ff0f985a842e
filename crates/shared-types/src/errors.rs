//! # Error Types
//!
//! Errors shared by every crate that reads the wire format.

use thiserror::Error;

/// Failure to decode a byte buffer.
///
/// Always recoverable: a decode error rejects one buffer, never the node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer ended before a fixed-size field could be read.
    #[error("Short buffer: needed {needed} bytes, {remaining} remaining")]
    ShortBuffer { needed: usize, remaining: usize },

    /// Leading tag byte does not match the variant being decoded.
    #[error("Invalid message type: expected {expected}, got {actual}")]
    UnexpectedType { expected: u8, actual: u8 },

    /// No decoder is registered for this tag.
    #[error("Unknown message type: {0}")]
    UnknownType(u8),

    /// A field was present but its contents are not acceptable.
    #[error("Malformed field {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
}

/// Node operational states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Normal operation.
    #[default]
    Running,
    /// Stopped after an integrity fault; an operator must intervene.
    HaltedAwaitingIntervention,
}
