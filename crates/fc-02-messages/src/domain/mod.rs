//! Domain layer: message variants, codec dispatch and per-lane state.

pub mod ack;
pub mod cache;
pub(crate) mod codec;
pub mod election;
pub mod error;
pub mod heartbeat;
pub mod message;
pub mod message_type;
pub mod missing_msg_response;
pub mod process_list;
pub mod signable;
pub mod validity;

pub use ack::Ack;
pub use cache::MessageCache;
pub use election::{ElectionMessage, ElectionPayload};
pub use error::{ExecutionError, MessageError};
pub use heartbeat::Heartbeat;
pub use message::Message;
pub use message_type::MessageType;
pub use missing_msg_response::MissingMsgResponse;
pub use process_list::ProcessList;
pub use signable::Signable;
pub use validity::Validity;
