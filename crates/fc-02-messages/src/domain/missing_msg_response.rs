//! Peer-to-peer re-delivery of an already acknowledged message.
//!
//! ```text
//! [ tag = 19 ][ timestamp (6) ][ flag u8 ]
//! [ len u32 ][ ack ]        only when flag = 1
//! [ len u32 ][ message ]
//! ```

use crate::domain::{codec, MessageCache, MessageType, Validity};
use crate::domain::Message;
use shared_crypto::sha256;
use shared_types::{ByteReader, ByteWriter, DecodeError, Hash, Timestamp};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMsgResponse {
    pub timestamp: Timestamp,
    pub ack: Option<Box<Message>>,
    pub msg: Box<Message>,
    cache: MessageCache,
}

impl MissingMsgResponse {
    pub const TYPE: MessageType = MessageType::MissingMsgResponse;

    pub fn new(timestamp: Timestamp, ack: Option<Message>, msg: Message) -> Self {
        Self {
            timestamp,
            ack: ack.map(Box::new),
            msg: Box::new(msg),
            cache: MessageCache::default(),
        }
    }

    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.push_u8(Self::TYPE.as_u8()).push_timestamp(self.timestamp);
        match &self.ack {
            Some(ack) => {
                w.push_u8(1);
                codec::push_nested(&mut w, ack);
            }
            None => {
                w.push_u8(0);
            }
        }
        codec::push_nested(&mut w, &self.msg);
        w.into_bytes()
    }

    pub fn unmarshal_binary_data(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let mut r = ByteReader::new(data);
        r.expect_tag(Self::TYPE.as_u8())?;
        let timestamp = r.pop_timestamp()?;
        let ack = match r.pop_u8()? {
            0 => None,
            1 => Some(codec::pop_nested(&mut r)?),
            other => {
                return Err(DecodeError::Malformed {
                    field: "ack flag",
                    reason: format!("expected 0 or 1, got {other}"),
                })
            }
        };
        let msg = codec::pop_nested(&mut r)?;
        Ok((Self::new(timestamp, ack, msg), r.into_rest()))
    }

    /// Unsigned, so content and message hash coincide.
    pub fn hash(&self) -> Hash {
        self.cache.hash_or_init(|| sha256(&self.marshal_binary()))
    }

    pub fn msg_hash(&self) -> Hash {
        self.cache.msg_hash_or_init(|| self.hash())
    }

    pub fn repeat_hash(&self) -> Hash {
        self.msg_hash()
    }

    pub fn validate(&self) -> Validity {
        if self.ack.is_none() {
            return Validity::Invalid;
        }
        Validity::Valid
    }

    /// Lane of the carried ack, or 0.
    pub fn compute_vm_index(&self) -> usize {
        match self.ack.as_deref() {
            Some(Message::Ack(ack)) => ack.compute_vm_index(),
            _ => 0,
        }
    }
}

impl fmt::Display for MissingMsgResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ack.as_deref() {
            Some(Message::Ack(ack)) => write!(
                f,
                "MissingMsgResponse <-- DBHeight:{:3} vm={:3} PL Height:{:3} msgHash[{}]",
                ack.db_height,
                ack.vm_index,
                ack.height,
                hex::encode(&self.msg_hash()[..3])
            ),
            _ => write!(f, "MissingMsgResponse (no Ack) <-- {}", self.msg),
        }
    }
}
