//! Driven ports (Outbound dependencies)

use crate::domain::BlockSet;
use async_trait::async_trait;
use shared_types::{ChainId, Hash};

/// Storage holding finalized block sets and chain head pointers.
#[async_trait]
pub trait BlockSetStore: Send + Sync {
    /// Block set at `height`, or `None` past the chain tip.
    async fn fetch_block_set(&self, height: u32) -> Result<Option<BlockSet>, String>;

    /// Persist head pointers as `(chain_id, key_mr)` pairs.
    async fn set_chain_heads(&self, heads: &[(ChainId, Hash)]) -> Result<(), String>;
}
