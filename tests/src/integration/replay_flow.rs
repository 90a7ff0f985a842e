//! # Replay Flow
//!
//! Chain heads are rebuilt from stored block sets after a node restarts:
//! every chain's head ends at its newest block below the first broken
//! directory-block link.

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use fc_05_block_replay::{
        rebuild_chain_heads, BlockRef, BlockSet, BlockSetStore, InMemoryBlockStore, ReplayError,
    };
    use shared_crypto::sha256;
    use shared_types::{ChainId, Hash, ZERO_HASH};
    use std::sync::Arc;

    fn chain(n: u8) -> ChainId {
        ChainId::new([n; 32])
    }

    /// Build a linked chain of block sets where every KeyMR is a hash of
    /// the chain ID and height.
    fn linked_sets(heights: u32, entry_chain: ChainId) -> Vec<BlockSet> {
        let key_mr = |chain_id: &ChainId, height: u32| -> Hash {
            let mut bytes = chain_id.as_bytes().to_vec();
            bytes.extend_from_slice(&height.to_be_bytes());
            sha256(&bytes)
        };
        let block = |chain_id: ChainId, height: u32| {
            let prev = if height == 0 {
                ZERO_HASH
            } else {
                key_mr(&chain_id, height - 1)
            };
            BlockRef::new(chain_id, key_mr(&chain_id, height), prev)
        };

        (0..heights)
            .map(|h| BlockSet {
                height: h,
                directory: block(chain(0x0D), h),
                admin: block(chain(0x0A), h),
                factoid: block(chain(0x0F), h),
                entry_credit: block(chain(0x0C), h),
                entries: vec![block(entry_chain, h)],
            })
            .collect()
    }

    #[tokio::test]
    async fn test_rebuild_after_restart() {
        init_tracing();
        let store = Arc::new(InMemoryBlockStore::new());
        let sets = linked_sets(25, chain(0x42));
        for set in sets.iter().cloned() {
            store.insert(set);
        }

        let port: Arc<dyn BlockSetStore> = store.clone();
        let last = rebuild_chain_heads(port.as_ref()).await.unwrap();

        assert_eq!(last, Some(24));
        let tip = &sets[24];
        for (chain_id, key_mr) in tip.chain_heads() {
            assert_eq!(store.chain_head(&chain_id), Some(key_mr));
        }
        assert_eq!(store.head_count(), 5);
    }

    #[tokio::test]
    async fn test_rebuild_stops_at_broken_link() {
        init_tracing();
        let store = InMemoryBlockStore::new();
        let mut sets = linked_sets(10, chain(0x42));
        sets[6].directory.prev_key_mr = ZERO_HASH;
        for set in sets.iter().cloned() {
            store.insert(set);
        }

        assert_eq!(
            rebuild_chain_heads(&store).await,
            Err(ReplayError::KeyMrMismatch { height: 6 })
        );
        assert_eq!(
            store.chain_head(&chain(0x0D)),
            Some(sets[5].directory.key_mr)
        );
    }
}
