//! # Heartbeat
//!
//! Liveness and identity proof broadcast by every server. A heartbeat has
//! no ledger effect; executing it marks the sending audit server online.
//!
//! ```text
//! [ tag = 10 ][ timestamp (6) ][ secret u32 ][ db_height u32 ]
//! [ dblock_hash (32) ][ identity_chain_id (32) ][ signature (96)? ]
//! ```
//!
//! The secret number is derived from a salt only the real server knows.
//! A heartbeat claiming this node's own identity with the wrong secret
//! means someone else is signing as us, which halts the node.

use crate::domain::{
    codec, ExecutionError, MessageCache, MessageError, MessageType, Signable, Validity,
};
use crate::ports::StateView;
use fc_01_identity_registry::IdentityRegistry;
use shared_crypto::{sha256, FullSignature, ServerKeyPair};
use shared_types::{ByteReader, ByteWriter, ChainId, DecodeError, Hash, Timestamp};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    pub timestamp: Timestamp,
    pub secret_number: u32,
    pub db_height: u32,
    pub dblock_hash: Hash,
    pub identity_chain_id: ChainId,
    signature: Option<FullSignature>,
    cache: MessageCache,
}

impl Heartbeat {
    pub const TYPE: MessageType = MessageType::Heartbeat;

    pub fn new(
        timestamp: Timestamp,
        secret_number: u32,
        db_height: u32,
        dblock_hash: Hash,
        identity_chain_id: ChainId,
    ) -> Self {
        Self {
            timestamp,
            secret_number,
            db_height,
            dblock_hash,
            identity_chain_id,
            signature: None,
            cache: MessageCache::default(),
        }
    }

    /// Attach or remove a signature, dropping cached hashes and the
    /// cached verification outcome.
    pub fn set_signature(&mut self, signature: Option<FullSignature>) {
        self.signature = signature;
        self.cache.clear();
    }

    fn write_unsigned(&self, w: &mut ByteWriter) {
        w.push_u8(Self::TYPE.as_u8())
            .push_timestamp(self.timestamp)
            .push_u32(self.secret_number)
            .push_u32(self.db_height)
            .push_hash(&self.dblock_hash)
            .push_chain_id(&self.identity_chain_id);
    }

    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(79 + FullSignature::LEN);
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
        let secret_number = r.pop_u32()?;
        let db_height = r.pop_u32()?;
        let dblock_hash = r.pop_hash()?;
        let identity_chain_id = r.pop_chain_id()?;
        let signature = codec::pop_optional_signature(&mut r)?;

        let mut heartbeat = Self::new(
            timestamp,
            secret_number,
            db_height,
            dblock_hash,
            identity_chain_id,
        );
        heartbeat.set_signature(signature);
        Ok((heartbeat, r.into_rest()))
    }

    /// Content hash over the unsigned form.
    pub fn hash(&self) -> Hash {
        self.cache.hash_or_init(|| {
            let mut w = ByteWriter::new();
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
        let now = state.timestamp().secs() as i64;
        let sent = self.timestamp.secs() as i64;
        if now - sent > state.max_message_age_secs() as i64 {
            debug!(heartbeat = %self, age_secs = now - sent, "Heartbeat too old");
            return Validity::Invalid;
        }
        if self.signature.is_none() {
            debug!(heartbeat = %self, "Heartbeat unsigned");
            return Validity::Invalid;
        }
        if self.db_height <= state.highest_saved_block() {
            debug!(heartbeat = %self, saved = state.highest_saved_block(), "Heartbeat for saved block");
            return Validity::Invalid;
        }
        match self.verify_signature(state.registry()) {
            Ok(true) => Validity::Valid,
            Ok(false) => {
                debug!(heartbeat = %self, "Heartbeat signature rejected");
                Validity::Invalid
            }
            Err(err) => {
                debug!(heartbeat = %self, %err, "Heartbeat signature unverifiable");
                Validity::Invalid
            }
        }
    }

    /// Lane derived from the identity chain ID bytes.
    pub fn compute_vm_index(&self, state: &dyn StateView) -> usize {
        let sum: usize = self
            .identity_chain_id
            .as_bytes()
            .iter()
            .map(|b| *b as usize)
            .sum();
        sum % state.lane_count().max(1)
    }

    pub fn leader_execute(&self, state: &dyn StateView) -> Result<(), ExecutionError> {
        self.follower_execute(state)
    }

    /// Mark the sending audit server online.
    ///
    /// Fails with `IntegrityViolation` when the heartbeat claims the local
    /// identity but carries a secret this node did not produce.
    pub fn follower_execute(&self, state: &dyn StateView) -> Result<(), ExecutionError> {
        let local = state.identity_chain_id();
        for audit in state.audit_servers(state.leader_height()) {
            if audit != self.identity_chain_id {
                continue;
            }
            if audit == local && self.secret_number != state.salt(self.timestamp) {
                return Err(ExecutionError::IntegrityViolation { chain_id: local });
            }
            if let Err(err) = state.registry().set_authority_online(&audit, true) {
                debug!(chain_id = %audit, %err, "Heartbeat from server without authority record");
            }
        }
        Ok(())
    }
}

impl Signable for Heartbeat {
    fn marshal_for_signature(&self) -> Result<Vec<u8>, MessageError> {
        if self.identity_chain_id.is_zero() {
            return Err(MessageError::Incomplete("identity_chain_id"));
        }
        let mut w = ByteWriter::with_capacity(79);
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
        let key = registry.signing_key(&self.identity_chain_id)?;
        let valid = signature.verify_with_key(&key, &bytes).is_ok();
        Ok(self.cache.record_sig_valid(valid))
    }

    fn signature(&self) -> Option<&FullSignature> {
        self.signature.as_ref()
    }
}

impl fmt::Display for Heartbeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HeartBeat ID[{}] dbht {} ts {}",
            hex::encode(&self.identity_chain_id.as_bytes()[3..5]),
            self.db_height,
            self.timestamp.secs()
        )
    }
}
