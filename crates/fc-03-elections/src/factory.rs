//! Constructors for election-internal messages and adapters.

use crate::adapter::ElectionAdapter;
use crate::domain::ElectionResult;
use fc_01_identity_registry::IdentityRegistry;
use fc_02_messages::{ElectionMessage, ElectionPayload, Message};
use shared_types::{ChainId, Timestamp};
use std::sync::Arc;

/// Builds election messages stamped by a clock.
#[derive(Debug, Clone, Copy)]
pub struct ElectionsFactory {
    clock: fn() -> Timestamp,
}

impl Default for ElectionsFactory {
    fn default() -> Self {
        Self {
            clock: Timestamp::now,
        }
    }
}

impl ElectionsFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed or simulated clock.
    pub fn with_clock(clock: fn() -> Timestamp) -> Self {
        Self { clock }
    }

    fn build(&self, name: &str, db_height: u32, payload: ElectionPayload) -> Message {
        ElectionMessage::new(name, (self.clock)(), db_height, payload).into()
    }

    pub fn new_add_leader_internal(&self, name: &str, db_height: u32, server_id: ChainId) -> Message {
        self.build(name, db_height, ElectionPayload::AddLeader { server_id })
    }

    pub fn new_add_audit_internal(&self, name: &str, db_height: u32, server_id: ChainId) -> Message {
        self.build(name, db_height, ElectionPayload::AddAudit { server_id })
    }

    pub fn new_remove_leader_internal(
        &self,
        name: &str,
        db_height: u32,
        server_id: ChainId,
    ) -> Message {
        self.build(name, db_height, ElectionPayload::RemoveLeader { server_id })
    }

    pub fn new_remove_audit_internal(
        &self,
        name: &str,
        db_height: u32,
        server_id: ChainId,
    ) -> Message {
        self.build(name, db_height, ElectionPayload::RemoveAudit { server_id })
    }

    pub fn new_eom_sig_internal(
        &self,
        name: &str,
        db_height: u32,
        minute: u32,
        height: u32,
        server_id: ChainId,
    ) -> Message {
        self.build(
            name,
            db_height,
            ElectionPayload::EomSig {
                minute,
                height,
                server_id,
            },
        )
    }

    pub fn new_dbsig_sig_internal(
        &self,
        name: &str,
        db_height: u32,
        minute: u32,
        height: u32,
        server_id: ChainId,
    ) -> Message {
        self.build(
            name,
            db_height,
            ElectionPayload::DbSigSig {
                minute,
                height,
                server_id,
            },
        )
    }

    /// Signals that a lane leader missed its deadline for `minute`.
    pub fn new_timeout_internal(&self, name: &str, db_height: u32, minute: u32) -> Message {
        self.build(name, db_height, ElectionPayload::Timeout { minute })
    }

    pub fn new_election_adapter(
        &self,
        name: impl Into<String>,
        self_id: ChainId,
        registry: Arc<IdentityRegistry>,
        db_height: u32,
        minutes_per_block: u32,
    ) -> ElectionResult<ElectionAdapter> {
        ElectionAdapter::from_registry(name, self_id, registry, db_height, minutes_per_block)
    }
}
