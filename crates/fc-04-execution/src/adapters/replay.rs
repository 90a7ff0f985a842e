//! In-memory missing-message handler.

use crate::ports::MissingMessageHandler;
use fc_02_messages::MissingMsgResponse;
use parking_lot::RwLock;
use shared_types::Hash;

/// Records the hash of every response handed to replay.
///
/// Used when no ledger is attached; a node running without ledger replay
/// still accounts for the responses it received.
#[derive(Debug, Default)]
pub struct RecordingReplayHandler {
    replayed: RwLock<Vec<Hash>>,
}

impl RecordingReplayHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replayed(&self) -> Vec<Hash> {
        self.replayed.read().clone()
    }

    pub fn count(&self) -> usize {
        self.replayed.read().len()
    }
}

impl MissingMessageHandler for RecordingReplayHandler {
    fn replay(&self, response: &MissingMsgResponse) -> Result<(), String> {
        self.replayed.write().push(response.msg_hash());
        Ok(())
    }
}
