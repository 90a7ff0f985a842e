//! In-memory block store.

use crate::domain::BlockSet;
use crate::ports::BlockSetStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ChainId, Hash};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryBlockStore {
    sets: RwLock<HashMap<u32, BlockSet>>,
    heads: RwLock<HashMap<ChainId, Hash>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, set: BlockSet) {
        self.sets.write().insert(set.height, set);
    }

    pub fn chain_head(&self, chain_id: &ChainId) -> Option<Hash> {
        self.heads.read().get(chain_id).copied()
    }

    pub fn head_count(&self) -> usize {
        self.heads.read().len()
    }
}

#[async_trait]
impl BlockSetStore for InMemoryBlockStore {
    async fn fetch_block_set(&self, height: u32) -> Result<Option<BlockSet>, String> {
        Ok(self.sets.read().get(&height).cloned())
    }

    async fn set_chain_heads(&self, heads: &[(ChainId, Hash)]) -> Result<(), String> {
        let mut stored = self.heads.write();
        for (chain_id, key_mr) in heads {
            stored.insert(*chain_id, *key_mr);
        }
        Ok(())
    }
}
