//! Finalized blocks for one directory-block height.

use shared_types::{ChainId, Hash};

/// The identifying hashes of one stored block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub chain_id: ChainId,
    pub key_mr: Hash,
    pub prev_key_mr: Hash,
}

impl BlockRef {
    pub fn new(chain_id: ChainId, key_mr: Hash, prev_key_mr: Hash) -> Self {
        Self {
            chain_id,
            key_mr,
            prev_key_mr,
        }
    }
}

/// Directory block plus every block it links at one height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSet {
    pub height: u32,
    pub directory: BlockRef,
    pub admin: BlockRef,
    pub factoid: BlockRef,
    pub entry_credit: BlockRef,
    pub entries: Vec<BlockRef>,
}

impl BlockSet {
    /// Whether this set's directory block links to `previous`.
    pub fn links_to(&self, previous: &BlockSet) -> bool {
        self.directory.prev_key_mr == previous.directory.key_mr
    }

    /// `(chain_id, key_mr)` for every block in the set, directory first.
    pub fn chain_heads(&self) -> Vec<(ChainId, Hash)> {
        [&self.directory, &self.admin, &self.factoid, &self.entry_credit]
            .into_iter()
            .chain(self.entries.iter())
            .map(|block| (block.chain_id, block.key_mr))
            .collect()
    }
}
