//! Election adapter: feeds election messages into the state machine and
//! turns its transitions into registry updates and follow-up messages.

use crate::domain::{ElectionError, ElectionPhase, ElectionResult, Elections};
use fc_01_identity_registry::{AuthorityStatus, IdentityRegistry};
use fc_02_messages::{ElectionMessage, Message};
use shared_types::ChainId;
use std::sync::Arc;
use tracing::debug;

/// One node's election driver.
pub struct ElectionAdapter {
    elections: Elections,
    name: String,
    self_id: ChainId,
    registry: Arc<IdentityRegistry>,
}

impl ElectionAdapter {
    pub fn new(
        name: impl Into<String>,
        self_id: ChainId,
        registry: Arc<IdentityRegistry>,
        elections: Elections,
    ) -> Self {
        Self {
            elections,
            name: name.into(),
            self_id,
            registry,
        }
    }

    /// Seed the roster from registry statuses.
    pub fn from_registry(
        name: impl Into<String>,
        self_id: ChainId,
        registry: Arc<IdentityRegistry>,
        db_height: u32,
        minutes_per_block: u32,
    ) -> ElectionResult<Self> {
        let ids = |status| {
            registry
                .authorities_with_status(status)
                .iter()
                .map(|authority| authority.authority_chain_id())
                .collect::<Vec<_>>()
        };
        let elections = Elections::new(
            db_height,
            minutes_per_block,
            ids(AuthorityStatus::Federated),
            ids(AuthorityStatus::Audit),
        )?;
        Ok(Self::new(name, self_id, registry, elections))
    }

    /// Process one election message; returns the message to emit next.
    ///
    /// Follow-ups carry the trigger's timestamp and height with this
    /// adapter's name.
    pub fn execute(&mut self, msg: &Message) -> ElectionResult<Option<Message>> {
        let Some(election_msg) = msg.as_election() else {
            return Err(ElectionError::NotElectionMessage(msg.message_type()));
        };

        let registry = &self.registry;
        let is_online = |id: &ChainId| {
            registry
                .get_authority(id)
                .is_some_and(|authority| authority.is_online())
        };
        let transition = self
            .elections
            .apply(election_msg, self.self_id, &is_online);

        for (server, status) in transition.status_changes {
            if let Err(err) = registry.set_authority_status(&server, status) {
                debug!(server = %server, %status, %err, "Roster change for unregistered authority");
            }
        }

        Ok(transition.follow_up.map(|payload| {
            ElectionMessage::new(
                self.name.clone(),
                election_msg.timestamp,
                election_msg.db_height,
                payload,
            )
            .into()
        }))
    }

    pub fn db_height(&self) -> u32 {
        self.elections.db_height()
    }

    pub fn minute(&self) -> u32 {
        self.elections.minute()
    }

    /// Lane under election, if any.
    pub fn electing(&self) -> Option<usize> {
        self.elections.electing()
    }

    pub fn phase(&self) -> ElectionPhase {
        self.elections.phase()
    }

    pub fn leader_of(&self, vm_index: usize) -> Option<ChainId> {
        self.elections.leader_of(vm_index)
    }

    pub fn lane_count(&self) -> usize {
        self.elections.lane_count()
    }

    pub fn federated_servers(&self) -> Vec<ChainId> {
        self.elections.federated_servers()
    }

    pub fn audit_servers(&self) -> Vec<ChainId> {
        self.elections.audit_servers()
    }

    pub fn elections(&self) -> &Elections {
        &self.elections
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn self_id(&self) -> ChainId {
        self.self_id
    }
}

impl std::fmt::Debug for ElectionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElectionAdapter")
            .field("name", &self.name)
            .field("db_height", &self.db_height())
            .field("minute", &self.minute())
            .field("phase", &self.phase())
            .finish()
    }
}
