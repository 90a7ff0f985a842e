//! Node-local state exposed to messages through `StateView`.

use crate::ports::{MissingMessageHandler, SystemTimeSource, TimeSource};
use fc_01_identity_registry::IdentityRegistry;
use fc_02_messages::{ExecutionError, MissingMsgResponse, StateView};
use parking_lot::RwLock;
use shared_crypto::Sha256Hasher;
use shared_types::{ChainId, Timestamp};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Roster-derived values shared by every lane.
#[derive(Debug, Clone, Default)]
struct Roster {
    audits: Vec<ChainId>,
    leaders: Vec<Option<ChainId>>,
}

/// State owned by one node's execution driver.
pub struct LocalState {
    registry: Arc<IdentityRegistry>,
    identity_chain_id: ChainId,
    salt_secret: [u8; 32],
    time_source: Arc<dyn TimeSource>,
    replay: Arc<dyn MissingMessageHandler>,
    max_message_age_secs: u64,
    highest_saved: AtomicU32,
    leader_height: AtomicU32,
    lane_count: AtomicUsize,
    roster: RwLock<Roster>,
}

impl LocalState {
    pub fn new(
        registry: Arc<IdentityRegistry>,
        identity_chain_id: ChainId,
        salt_secret: [u8; 32],
        replay: Arc<dyn MissingMessageHandler>,
        max_message_age_secs: u64,
    ) -> Self {
        Self {
            registry,
            identity_chain_id,
            salt_secret,
            time_source: Arc::new(SystemTimeSource),
            replay,
            max_message_age_secs,
            highest_saved: AtomicU32::new(0),
            leader_height: AtomicU32::new(0),
            lane_count: AtomicUsize::new(1),
            roster: RwLock::new(Roster::default()),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn registry_handle(&self) -> Arc<IdentityRegistry> {
        Arc::clone(&self.registry)
    }

    /// Raise the saved height; never lowers it.
    pub fn raise_highest_saved(&self, height: u32) {
        self.highest_saved.fetch_max(height, Ordering::SeqCst);
    }

    pub fn set_leader_height(&self, height: u32) {
        self.leader_height.store(height, Ordering::SeqCst);
    }

    pub fn set_lane_count(&self, lanes: usize) {
        self.lane_count.store(lanes.max(1), Ordering::SeqCst);
    }

    /// Replace the audit list and per-lane leaders.
    pub fn set_roster(&self, audits: Vec<ChainId>, leaders: Vec<Option<ChainId>>) {
        *self.roster.write() = Roster { audits, leaders };
    }

    pub fn leader_of(&self, vm_index: usize) -> Option<ChainId> {
        self.roster.read().leaders.get(vm_index).copied().flatten()
    }

    /// Whether the local identity currently leads `vm_index`.
    pub fn leads(&self, vm_index: usize) -> bool {
        self.leader_of(vm_index) == Some(self.identity_chain_id)
    }
}

impl StateView for LocalState {
    fn timestamp(&self) -> Timestamp {
        self.time_source.now()
    }

    fn highest_saved_block(&self) -> u32 {
        self.highest_saved.load(Ordering::SeqCst)
    }

    fn leader_height(&self) -> u32 {
        self.leader_height.load(Ordering::SeqCst)
    }

    /// Only the height being built has a roster; no history is kept.
    fn audit_servers(&self, height: u32) -> Vec<ChainId> {
        if height != self.leader_height() {
            return Vec::new();
        }
        self.roster.read().audits.clone()
    }

    fn identity_chain_id(&self) -> ChainId {
        self.identity_chain_id
    }

    /// First four bytes of SHA-256(secret || timestamp).
    fn salt(&self, timestamp: Timestamp) -> u32 {
        let mut hasher = Sha256Hasher::new();
        hasher.update(&self.salt_secret).update(&timestamp.to_bytes());
        let digest = hasher.finalize();
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }

    fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    fn lane_count(&self) -> usize {
        self.lane_count.load(Ordering::SeqCst)
    }

    fn max_message_age_secs(&self) -> u64 {
        self.max_message_age_secs
    }

    fn follower_execute_mmr(&self, response: &MissingMsgResponse) -> Result<(), ExecutionError> {
        self.replay.replay(response).map_err(|reason| {
            warn!(response = %response, %reason, "Missing-message replay failed");
            ExecutionError::Replay(reason)
        })
    }
}
