//! # Message
//!
//! Closed sum over every message kind the core understands, with dispatch
//! from the leading tag byte to the variant's codec, validation and
//! execution.

use crate::domain::{
    Ack, ElectionMessage, ExecutionError, Heartbeat, MessageType, MissingMsgResponse,
    ProcessList, Signable, Validity,
};
use crate::ports::StateView;
use shared_types::{ByteReader, DecodeError, Hash, Timestamp};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Ack(Ack),
    Heartbeat(Heartbeat),
    MissingMsgResponse(MissingMsgResponse),
    Election(ElectionMessage),
}

impl Message {
    /// Decode one message from the front of `data`, returning the rest.
    pub fn unmarshal_binary_data(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let kind = MessageType::try_from(ByteReader::new(data).peek_u8()?)?;
        match kind {
            MessageType::Ack => {
                Ack::unmarshal_binary_data(data).map(|(m, rest)| (Self::Ack(m), rest))
            }
            MessageType::Heartbeat => {
                Heartbeat::unmarshal_binary_data(data).map(|(m, rest)| (Self::Heartbeat(m), rest))
            }
            MessageType::MissingMsgResponse => MissingMsgResponse::unmarshal_binary_data(data)
                .map(|(m, rest)| (Self::MissingMsgResponse(m), rest)),
            _ => ElectionMessage::unmarshal_binary_data(data)
                .map(|(m, rest)| (Self::Election(m), rest)),
        }
    }

    /// Decode a buffer that must hold exactly one message.
    pub fn unmarshal_binary(data: &[u8]) -> Result<Self, DecodeError> {
        let (msg, rest) = Self::unmarshal_binary_data(data)?;
        if !rest.is_empty() {
            return Err(DecodeError::Malformed {
                field: "message",
                reason: format!("{} trailing bytes", rest.len()),
            });
        }
        Ok(msg)
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Ack(_) => MessageType::Ack,
            Self::Heartbeat(_) => MessageType::Heartbeat,
            Self::MissingMsgResponse(_) => MessageType::MissingMsgResponse,
            Self::Election(m) => m.message_type(),
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Ack(m) => m.timestamp,
            Self::Heartbeat(m) => m.timestamp,
            Self::MissingMsgResponse(m) => m.timestamp,
            Self::Election(m) => m.timestamp,
        }
    }

    pub fn marshal_binary(&self) -> Vec<u8> {
        match self {
            Self::Ack(m) => m.marshal_binary(),
            Self::Heartbeat(m) => m.marshal_binary(),
            Self::MissingMsgResponse(m) => m.marshal_binary(),
            Self::Election(m) => m.marshal_binary(),
        }
    }

    /// Content hash, independent of any signature.
    pub fn hash(&self) -> Hash {
        match self {
            Self::Ack(m) => m.hash(),
            Self::Heartbeat(m) => m.hash(),
            Self::MissingMsgResponse(m) => m.hash(),
            Self::Election(m) => m.hash(),
        }
    }

    /// Hash of the full encoding, signature included.
    pub fn msg_hash(&self) -> Hash {
        match self {
            Self::Ack(m) => m.msg_hash(),
            Self::Heartbeat(m) => m.msg_hash(),
            Self::MissingMsgResponse(m) => m.msg_hash(),
            Self::Election(m) => m.msg_hash(),
        }
    }

    pub fn repeat_hash(&self) -> Hash {
        match self {
            Self::Ack(m) => m.repeat_hash(),
            Self::Heartbeat(m) => m.repeat_hash(),
            Self::MissingMsgResponse(m) => m.repeat_hash(),
            Self::Election(m) => m.repeat_hash(),
        }
    }

    pub fn validate(&self, state: &dyn StateView) -> Validity {
        match self {
            Self::Ack(m) => m.validate(state),
            Self::Heartbeat(m) => m.validate(state),
            Self::MissingMsgResponse(m) => m.validate(),
            // Built locally; the adapter checks them against its own state.
            Self::Election(_) => Validity::Valid,
        }
    }

    /// Deterministic processing lane.
    pub fn compute_vm_index(&self, state: &dyn StateView) -> usize {
        match self {
            Self::Ack(m) => m.compute_vm_index(),
            Self::Heartbeat(m) => m.compute_vm_index(state),
            Self::MissingMsgResponse(m) => m.compute_vm_index(),
            Self::Election(m) => m.compute_vm_index(),
        }
    }

    pub fn leader_execute(
        &self,
        state: &dyn StateView,
        process_list: &mut ProcessList,
    ) -> Result<(), ExecutionError> {
        self.execute(state, process_list, true)
    }

    pub fn follower_execute(
        &self,
        state: &dyn StateView,
        process_list: &mut ProcessList,
    ) -> Result<(), ExecutionError> {
        self.execute(state, process_list, false)
    }

    /// Shared execution path. A repeat hash already in the process list is
    /// skipped so duplicate delivery never applies twice. Election messages
    /// only leave a trace here; the election adapter applies them.
    fn execute(
        &self,
        state: &dyn StateView,
        process_list: &mut ProcessList,
        as_leader: bool,
    ) -> Result<(), ExecutionError> {
        let repeat_hash = self.repeat_hash();
        if process_list.has_seen(&repeat_hash) {
            debug!(vm = process_list.vm_index(), msg = %self, "Duplicate delivery skipped");
            return Ok(());
        }

        match self {
            Self::Ack(m) => m.execute(process_list),
            Self::Heartbeat(m) if as_leader => m.leader_execute(state)?,
            Self::Heartbeat(m) => m.follower_execute(state)?,
            Self::MissingMsgResponse(m) => state.follower_execute_mmr(m)?,
            Self::Election(_) => {}
        }

        process_list.mark_executed(repeat_hash);
        Ok(())
    }

    /// Sent only to the requesting peer, never broadcast.
    pub fn is_peer_to_peer(&self) -> bool {
        matches!(self, Self::MissingMsgResponse(_))
    }

    pub fn is_internal(&self) -> bool {
        self.message_type().is_internal()
    }

    pub fn as_signable(&self) -> Option<&dyn Signable> {
        match self {
            Self::Ack(m) => Some(m),
            Self::Heartbeat(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_election(&self) -> Option<&ElectionMessage> {
        match self {
            Self::Election(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Ack> for Message {
    fn from(m: Ack) -> Self {
        Self::Ack(m)
    }
}

impl From<Heartbeat> for Message {
    fn from(m: Heartbeat) -> Self {
        Self::Heartbeat(m)
    }
}

impl From<MissingMsgResponse> for Message {
    fn from(m: MissingMsgResponse) -> Self {
        Self::MissingMsgResponse(m)
    }
}

impl From<ElectionMessage> for Message {
    fn from(m: ElectionMessage) -> Self {
        Self::Election(m)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack(m) => fmt::Display::fmt(m, f),
            Self::Heartbeat(m) => fmt::Display::fmt(m, f),
            Self::MissingMsgResponse(m) => fmt::Display::fmt(m, f),
            Self::Election(m) => fmt::Display::fmt(m, f),
        }
    }
}
