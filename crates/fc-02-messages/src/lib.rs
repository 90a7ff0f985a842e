//! # fc-02-messages
//!
//! The consensus message contract.
//!
//! ## Architecture
//!
//! Every message is a variant of the closed [`Message`] sum type. The first
//! byte of the encoding selects the variant:
//!
//! ```text
//! bytes ──peek tag──→ Ack | Heartbeat | MissingMsgResponse | Election(..)
//!                         │
//!                  validate(state) → Invalid (-1) | Pending (0) | Valid (1)
//!                         │ Valid
//!                  compute_vm_index(state) → lane
//!                         │
//!         leader_execute / follower_execute(state, &mut ProcessList)
//! ```
//!
//! - Decoding never panics; malformed input is a `DecodeError`.
//! - Content hash, message hash and the signature check are memoized once
//!   per instance. Re-signing clears them.
//! - Lane assignment uses only message content and the shared roster size.
//! - Execution skips a repeat hash already in the lane's process list.
//! - A heartbeat impersonating the local identity fails with
//!   `ExecutionError::IntegrityViolation`, the one fatal outcome.
//!
//! Node state reaches messages through the [`StateView`] port.

pub mod domain;
pub mod ports;

pub use domain::{
    Ack, ElectionMessage, ElectionPayload, ExecutionError, Heartbeat, Message, MessageCache,
    MessageError, MessageType, MissingMsgResponse, ProcessList, Signable, Validity,
};
pub use ports::StateView;
