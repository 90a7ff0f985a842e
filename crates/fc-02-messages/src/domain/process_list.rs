//! Per-lane execution bookkeeping.

use shared_types::Hash;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Execution record of one lane for one directory-block height.
///
/// Only the lane's executor mutates it; the driver holds one lock per lane.
#[derive(Debug, Clone, Default)]
pub struct ProcessList {
    vm_index: usize,
    db_height: u32,
    seen: HashSet<Hash>,
    executed: Vec<Hash>,
    acks: BTreeMap<u32, Hash>,
}

impl ProcessList {
    pub fn new(vm_index: usize, db_height: u32) -> Self {
        Self {
            vm_index,
            db_height,
            ..Self::default()
        }
    }

    pub fn vm_index(&self) -> usize {
        self.vm_index
    }

    pub fn db_height(&self) -> u32 {
        self.db_height
    }

    pub fn has_seen(&self, repeat_hash: &Hash) -> bool {
        self.seen.contains(repeat_hash)
    }

    /// Record a message as executed. Returns `false` if it already was.
    pub fn mark_executed(&mut self, repeat_hash: Hash) -> bool {
        if !self.seen.insert(repeat_hash) {
            return false;
        }
        self.executed.push(repeat_hash);
        true
    }

    /// Repeat hashes in execution order.
    pub fn executed(&self) -> &[Hash] {
        &self.executed
    }

    /// Bind `message_hash` to a process-list height.
    ///
    /// Returns `false` when the height already holds a different message.
    pub fn record_ack(&mut self, height: u32, message_hash: Hash) -> bool {
        match self.acks.get(&height) {
            Some(existing) if *existing != message_hash => {
                debug!(
                    vm = self.vm_index,
                    height,
                    existing = %hex::encode(&existing[..3]),
                    "Conflicting ack ignored"
                );
                false
            }
            Some(_) => true,
            None => {
                self.acks.insert(height, message_hash);
                true
            }
        }
    }

    pub fn ack_at(&self, height: u32) -> Option<Hash> {
        self.acks.get(&height).copied()
    }

    pub fn len(&self) -> usize {
        self.executed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executed.is_empty()
    }

    /// Start over for a new directory-block height.
    pub fn reset(&mut self, db_height: u32) {
        *self = Self::new(self.vm_index, db_height);
    }
}
