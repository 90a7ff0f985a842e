//! Leader acknowledgement binding a message to a process-list height.
//!
//! ```text
//! [ tag = 1 ][ timestamp (6) ][ salt_number u32 ][ message_hash (32) ]
//! [ db_height u32 ][ vm_index u32 ][ minute u8 ][ height u32 ]
//! [ serial_hash (32) ][ leader_chain_id (32) ][ signature (96)? ]
//! ```

use crate::domain::{
    codec, MessageCache, MessageError, MessageType, ProcessList, Signable, Validity,
};
use crate::ports::StateView;
use fc_01_identity_registry::IdentityRegistry;
use shared_crypto::{sha256, FullSignature, ServerKeyPair};
use shared_types::{ByteReader, ByteWriter, ChainId, DecodeError, Hash, Timestamp, ZERO_HASH};
use std::fmt;
use tracing::debug;

const UNSIGNED_LEN: usize = 1 + 6 + 4 + 32 + 4 + 4 + 1 + 4 + 32 + 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub timestamp: Timestamp,
    pub salt_number: u32,
    /// Hash of the acknowledged message.
    pub message_hash: Hash,
    pub db_height: u32,
    pub vm_index: u32,
    pub minute: u8,
    /// Position in the lane's process list.
    pub height: u32,
    pub serial_hash: Hash,
    pub leader_chain_id: ChainId,
    signature: Option<FullSignature>,
    cache: MessageCache,
}

impl Ack {
    pub const TYPE: MessageType = MessageType::Ack;

    pub fn new(
        timestamp: Timestamp,
        leader_chain_id: ChainId,
        vm_index: u32,
        db_height: u32,
        minute: u8,
        height: u32,
        message_hash: Hash,
    ) -> Self {
        Self {
            timestamp,
            salt_number: 0,
            message_hash,
            db_height,
            vm_index,
            minute,
            height,
            serial_hash: ZERO_HASH,
            leader_chain_id,
            signature: None,
            cache: MessageCache::default(),
        }
    }

    pub fn with_salt_number(mut self, salt_number: u32) -> Self {
        self.salt_number = salt_number;
        self.cache.clear();
        self
    }

    pub fn with_serial_hash(mut self, serial_hash: Hash) -> Self {
        self.serial_hash = serial_hash;
        self.cache.clear();
        self
    }

    /// Attach or remove a signature; cached values are discarded.
    pub fn set_signature(&mut self, signature: Option<FullSignature>) {
        self.signature = signature;
        self.cache.clear();
    }

    fn write_unsigned(&self, w: &mut ByteWriter) {
        w.push_u8(Self::TYPE.as_u8())
            .push_timestamp(self.timestamp)
            .push_u32(self.salt_number)
            .push_hash(&self.message_hash)
            .push_u32(self.db_height)
            .push_u32(self.vm_index)
            .push_u8(self.minute)
            .push_u32(self.height)
            .push_hash(&self.serial_hash)
            .push_chain_id(&self.leader_chain_id);
    }

    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(UNSIGNED_LEN + FullSignature::LEN);
        self.write_unsigned(&mut w);
        if let Some(signature) = &self.signature {
            signature.write(&mut w);
        }
        w.into_bytes()
    }

    pub fn unmarshal_binary_data(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let mut r = ByteReader::new(data);
        r.expect_tag(Self::TYPE.as_u8())?;
        let timestamp = r.pop_timestamp()?;
        let salt_number = r.pop_u32()?;
        let message_hash = r.pop_hash()?;
        let db_height = r.pop_u32()?;
        let vm_index = r.pop_u32()?;
        let minute = r.pop_u8()?;
        let height = r.pop_u32()?;
        let serial_hash = r.pop_hash()?;
        let leader_chain_id = r.pop_chain_id()?;
        let signature = codec::pop_optional_signature(&mut r)?;

        let ack = Self {
            timestamp,
            salt_number,
            message_hash,
            db_height,
            vm_index,
            minute,
            height,
            serial_hash,
            leader_chain_id,
            signature,
            cache: MessageCache::default(),
        };
        Ok((ack, r.into_rest()))
    }

    pub fn hash(&self) -> Hash {
        self.cache.hash_or_init(|| {
            let mut w = ByteWriter::with_capacity(UNSIGNED_LEN);
            self.write_unsigned(&mut w);
            sha256(&w.into_bytes())
        })
    }

    pub fn msg_hash(&self) -> Hash {
        self.cache
            .msg_hash_or_init(|| sha256(&self.marshal_binary()))
    }

    pub fn repeat_hash(&self) -> Hash {
        self.msg_hash()
    }

    pub fn validate(&self, state: &dyn StateView) -> Validity {
        if self.signature.is_none() {
            return Validity::Invalid;
        }
        if self.db_height <= state.highest_saved_block() {
            return Validity::Invalid;
        }
        if self.db_height > state.leader_height() {
            debug!(ack = %self, leader_height = state.leader_height(), "Ack for future block");
            return Validity::Pending;
        }
        // The leader's identity or its signing key may be registered later
        // in the same block.
        match state.registry().get_identity(&self.leader_chain_id) {
            Some(identity) if identity.signing_key.is_some() => {}
            Some(_) => {
                debug!(ack = %self, "Ack leader has no signing key yet");
                return Validity::Pending;
            }
            None => {
                debug!(ack = %self, "Ack leader not yet known");
                return Validity::Pending;
            }
        }
        match self.verify_signature(state.registry()) {
            Ok(true) => Validity::Valid,
            Ok(false) | Err(_) => Validity::Invalid,
        }
    }

    pub fn compute_vm_index(&self) -> usize {
        self.vm_index as usize
    }

    /// Bind the acknowledged message to its process-list height.
    pub fn execute(&self, process_list: &mut ProcessList) {
        process_list.record_ack(self.height, self.message_hash);
    }
}

impl Signable for Ack {
    fn marshal_for_signature(&self) -> Result<Vec<u8>, MessageError> {
        if self.leader_chain_id.is_zero() {
            return Err(MessageError::Incomplete("leader_chain_id"));
        }
        let mut w = ByteWriter::with_capacity(UNSIGNED_LEN);
        self.write_unsigned(&mut w);
        Ok(w.into_bytes())
    }

    fn sign(&mut self, key: &ServerKeyPair) -> Result<(), MessageError> {
        let bytes = self.marshal_for_signature()?;
        self.set_signature(Some(key.sign_full(&bytes)));
        Ok(())
    }

    fn verify_signature(&self, registry: &IdentityRegistry) -> Result<bool, MessageError> {
        if let Some(valid) = self.cache.sig_valid() {
            return Ok(valid);
        }
        let Some(signature) = &self.signature else {
            return Ok(false);
        };
        let bytes = self.marshal_for_signature()?;
        let key = registry.signing_key(&self.leader_chain_id)?;
        let valid = signature.verify_with_key(&key, &bytes).is_ok();
        Ok(self.cache.record_sig_valid(valid))
    }

    fn signature(&self) -> Option<&FullSignature> {
        self.signature.as_ref()
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ack DBHeight:{:3} vm={:3} PL Height:{:3} minute:{:2} msgHash[{}]",
            self.db_height,
            self.vm_index,
            self.height,
            self.minute,
            hex::encode(&self.message_hash[..3])
        )
    }
}
