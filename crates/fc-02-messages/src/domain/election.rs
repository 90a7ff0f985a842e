//! # Election-Internal Messages
//!
//! Built locally to drive leader replacement. They share the message
//! contract but are never relayed to peers and carry no signature.
//!
//! ```text
//! [ tag ][ timestamp (6) ][ len u32 ][ name ][ db_height u32 ][ payload ]
//! ```
//!
//! | Tag | Payload |
//! |-----|---------|
//! | 29-32 add/remove leader/audit | `server_id (32)` |
//! | 33 timeout | `minute u32` |
//! | 34 EOM sig, 38 DBSig sig | `minute u32, height u32, server_id (32)` |
//! | 36 volunteer | `minute u32, vm_index u32, round u32, server_id (32)` |
//! | 37 vote | volunteer fields, then `voter (32)` |

use crate::domain::{MessageCache, MessageType};
use shared_crypto::sha256;
use shared_types::{ByteReader, ByteWriter, ChainId, DecodeError, Hash, Timestamp};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionPayload {
    AddLeader {
        server_id: ChainId,
    },
    RemoveLeader {
        server_id: ChainId,
    },
    AddAudit {
        server_id: ChainId,
    },
    RemoveAudit {
        server_id: ChainId,
    },
    /// The leader of some lane missed its deadline.
    Timeout {
        minute: u32,
    },
    EomSig {
        minute: u32,
        height: u32,
        server_id: ChainId,
    },
    DbSigSig {
        minute: u32,
        height: u32,
        server_id: ChainId,
    },
    /// An audit server offers to replace the faulted leader of `vm_index`.
    Volunteer {
        minute: u32,
        vm_index: u32,
        round: u32,
        server_id: ChainId,
    },
    /// `voter` supports `server_id` for `vm_index` in `round`.
    Vote {
        minute: u32,
        vm_index: u32,
        round: u32,
        server_id: ChainId,
        voter: ChainId,
    },
}

impl ElectionPayload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::AddLeader { .. } => MessageType::AddLeaderInternal,
            Self::RemoveLeader { .. } => MessageType::RemoveLeaderInternal,
            Self::AddAudit { .. } => MessageType::AddAuditInternal,
            Self::RemoveAudit { .. } => MessageType::RemoveAuditInternal,
            Self::Timeout { .. } => MessageType::TimeoutInternal,
            Self::EomSig { .. } => MessageType::EomSigInternal,
            Self::DbSigSig { .. } => MessageType::DbSigSigInternal,
            Self::Volunteer { .. } => MessageType::VolunteerInternal,
            Self::Vote { .. } => MessageType::VoteInternal,
        }
    }

    /// Server the message is about, if any.
    pub fn server_id(&self) -> Option<ChainId> {
        match self {
            Self::AddLeader { server_id }
            | Self::RemoveLeader { server_id }
            | Self::AddAudit { server_id }
            | Self::RemoveAudit { server_id }
            | Self::EomSig { server_id, .. }
            | Self::DbSigSig { server_id, .. }
            | Self::Volunteer { server_id, .. }
            | Self::Vote { server_id, .. } => Some(*server_id),
            Self::Timeout { .. } => None,
        }
    }

    fn write(&self, w: &mut ByteWriter) {
        match self {
            Self::AddLeader { server_id }
            | Self::RemoveLeader { server_id }
            | Self::AddAudit { server_id }
            | Self::RemoveAudit { server_id } => {
                w.push_chain_id(server_id);
            }
            Self::Timeout { minute } => {
                w.push_u32(*minute);
            }
            Self::EomSig {
                minute,
                height,
                server_id,
            }
            | Self::DbSigSig {
                minute,
                height,
                server_id,
            } => {
                w.push_u32(*minute).push_u32(*height).push_chain_id(server_id);
            }
            Self::Volunteer {
                minute,
                vm_index,
                round,
                server_id,
            } => {
                w.push_u32(*minute)
                    .push_u32(*vm_index)
                    .push_u32(*round)
                    .push_chain_id(server_id);
            }
            Self::Vote {
                minute,
                vm_index,
                round,
                server_id,
                voter,
            } => {
                w.push_u32(*minute)
                    .push_u32(*vm_index)
                    .push_u32(*round)
                    .push_chain_id(server_id)
                    .push_chain_id(voter);
            }
        }
    }

    fn read(kind: MessageType, r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(match kind {
            MessageType::AddLeaderInternal => Self::AddLeader {
                server_id: r.pop_chain_id()?,
            },
            MessageType::RemoveLeaderInternal => Self::RemoveLeader {
                server_id: r.pop_chain_id()?,
            },
            MessageType::AddAuditInternal => Self::AddAudit {
                server_id: r.pop_chain_id()?,
            },
            MessageType::RemoveAuditInternal => Self::RemoveAudit {
                server_id: r.pop_chain_id()?,
            },
            MessageType::TimeoutInternal => Self::Timeout {
                minute: r.pop_u32()?,
            },
            MessageType::EomSigInternal => Self::EomSig {
                minute: r.pop_u32()?,
                height: r.pop_u32()?,
                server_id: r.pop_chain_id()?,
            },
            MessageType::DbSigSigInternal => Self::DbSigSig {
                minute: r.pop_u32()?,
                height: r.pop_u32()?,
                server_id: r.pop_chain_id()?,
            },
            MessageType::VolunteerInternal => Self::Volunteer {
                minute: r.pop_u32()?,
                vm_index: r.pop_u32()?,
                round: r.pop_u32()?,
                server_id: r.pop_chain_id()?,
            },
            MessageType::VoteInternal => Self::Vote {
                minute: r.pop_u32()?,
                vm_index: r.pop_u32()?,
                round: r.pop_u32()?,
                server_id: r.pop_chain_id()?,
                voter: r.pop_chain_id()?,
            },
            other => return Err(DecodeError::UnknownType(other.as_u8())),
        })
    }
}

/// An election-internal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionMessage {
    /// Name of the node that built the message.
    pub name: String,
    pub timestamp: Timestamp,
    pub db_height: u32,
    pub payload: ElectionPayload,
    cache: MessageCache,
}

impl ElectionMessage {
    pub fn new(
        name: impl Into<String>,
        timestamp: Timestamp,
        db_height: u32,
        payload: ElectionPayload,
    ) -> Self {
        Self {
            name: name.into(),
            timestamp,
            db_height,
            payload,
            cache: MessageCache::default(),
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(64 + self.name.len());
        w.push_u8(self.message_type().as_u8())
            .push_timestamp(self.timestamp)
            .push_str(&self.name)
            .push_u32(self.db_height);
        self.payload.write(&mut w);
        w.into_bytes()
    }

    pub fn unmarshal_binary_data(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let mut r = ByteReader::new(data);
        let kind = MessageType::try_from(r.pop_u8()?)?;
        if !kind.is_internal() {
            return Err(DecodeError::UnexpectedType {
                expected: MessageType::AddLeaderInternal.as_u8(),
                actual: kind.as_u8(),
            });
        }
        let timestamp = r.pop_timestamp()?;
        let name = r.pop_string("name")?;
        let db_height = r.pop_u32()?;
        let payload = ElectionPayload::read(kind, &mut r)?;
        Ok((
            Self::new(name, timestamp, db_height, payload),
            r.into_rest(),
        ))
    }

    /// Decode a specific election variant.
    pub fn unmarshal_expecting(
        expected: MessageType,
        data: &[u8],
    ) -> Result<(Self, &[u8]), DecodeError> {
        let actual = ByteReader::new(data).peek_u8()?;
        if actual != expected.as_u8() {
            return Err(DecodeError::UnexpectedType {
                expected: expected.as_u8(),
                actual,
            });
        }
        Self::unmarshal_binary_data(data)
    }

    pub fn hash(&self) -> Hash {
        self.cache.hash_or_init(|| sha256(&self.marshal_binary()))
    }

    pub fn msg_hash(&self) -> Hash {
        self.cache.msg_hash_or_init(|| self.hash())
    }

    pub fn repeat_hash(&self) -> Hash {
        self.msg_hash()
    }

    /// Lane the message concerns; 0 for roster-wide messages.
    pub fn compute_vm_index(&self) -> usize {
        match self.payload {
            ElectionPayload::Volunteer { vm_index, .. } | ElectionPayload::Vote { vm_index, .. } => {
                vm_index as usize
            }
            _ => 0,
        }
    }
}

impl fmt::Display for ElectionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} dbht {}",
            self.message_type(),
            self.name,
            self.db_height
        )?;
        match self.payload {
            ElectionPayload::Timeout { minute } => write!(f, " min {minute}"),
            ElectionPayload::EomSig { minute, height, .. }
            | ElectionPayload::DbSigSig { minute, height, .. } => {
                write!(f, " min {minute} ht {height}")
            }
            ElectionPayload::Volunteer {
                vm_index, round, ..
            }
            | ElectionPayload::Vote {
                vm_index, round, ..
            } => write!(f, " vm {vm_index} round {round}"),
            _ => Ok(()),
        }?;
        if let Some(server_id) = self.payload.server_id() {
            write!(f, " server[{}]", hex::encode(&server_id.as_bytes()[..3]))?;
        }
        Ok(())
    }
}
