//! Chain-head rebuild.

use crate::domain::{BlockSet, ReplayError, ReplayResult};
use crate::ports::BlockSetStore;
use tracing::{debug, info};

/// Heights between progress log lines.
const PROGRESS_INTERVAL: u32 = 1000;

/// Walk stored block sets from height 0 and reset every chain head to the
/// highest block reachable through an unbroken directory-block chain.
///
/// Returns the last height processed, or `None` for an empty store. Stops
/// with `KeyMrMismatch` at the first directory block that does not link to
/// its predecessor; heads written for lower heights stay in place.
pub async fn rebuild_chain_heads<S>(store: &S) -> ReplayResult<Option<u32>>
where
    S: BlockSetStore + ?Sized,
{
    let mut previous: Option<BlockSet> = None;
    let mut height: u32 = 0;

    loop {
        if height % PROGRESS_INTERVAL == 0 {
            info!(height, "Rebuilding chain heads");
        }

        let Some(set) = store
            .fetch_block_set(height)
            .await
            .map_err(ReplayError::Store)?
        else {
            let last = previous.map(|set| set.height);
            info!(last_height = ?last, "Chain heads rebuilt");
            return Ok(last);
        };

        if let Some(prev) = &previous {
            if !set.links_to(prev) {
                return Err(ReplayError::KeyMrMismatch { height });
            }
        }

        let heads = set.chain_heads();
        debug!(height, chains = heads.len(), "Setting chain heads");
        store
            .set_chain_heads(&heads)
            .await
            .map_err(ReplayError::Store)?;

        previous = Some(set);
        height = match height.checked_add(1) {
            Some(next) => next,
            None => return Ok(Some(height)),
        };
    }
}
