//! Read-mostly view of node state used during validation and execution.

use crate::domain::{ExecutionError, MissingMsgResponse};
use fc_01_identity_registry::IdentityRegistry;
use shared_types::{ChainId, Timestamp};

/// Default clock drift window for signed liveness messages.
pub const DEFAULT_MAX_MESSAGE_AGE_SECS: u64 = 60;

/// Node state as seen by messages.
///
/// Implemented by the execution driver. Everything a message uses to pick
/// a lane must be identical on every node; only validation and liveness
/// checks may consult local values such as the clock or the local identity.
pub trait StateView: Send + Sync {
    /// Local clock.
    fn timestamp(&self) -> Timestamp;

    /// Highest directory block already saved.
    fn highest_saved_block(&self) -> u32;

    /// Height currently being built.
    fn leader_height(&self) -> u32;

    /// Audit servers for a height, in chain-ID order.
    fn audit_servers(&self, height: u32) -> Vec<ChainId>;

    /// Identity this node signs as.
    fn identity_chain_id(&self) -> ChainId;

    /// Secret this node embeds in heartbeats stamped `timestamp`.
    fn salt(&self, timestamp: Timestamp) -> u32;

    fn registry(&self) -> &IdentityRegistry;

    /// Number of processing lanes. Never zero.
    fn lane_count(&self) -> usize;

    fn max_message_age_secs(&self) -> u64 {
        DEFAULT_MAX_MESSAGE_AGE_SECS
    }

    /// Hand a missing-message response to ledger replay.
    fn follower_execute_mmr(&self, response: &MissingMsgResponse) -> Result<(), ExecutionError>;
}
