//! # fc-05-block-replay
//!
//! Rebuilds chain head pointers from finalized block sets.
//!
//! The storage engine lives outside the core; it is reached through the
//! async [`BlockSetStore`] port. [`rebuild_chain_heads`] walks heights from
//! zero, checks that each directory block links to the one below it and
//! points every chain's head at its newest block.
//!
//! ```rust,ignore
//! let store = InMemoryBlockStore::new();
//! let last = rebuild_chain_heads(&store).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryBlockStore;
pub use domain::{BlockRef, BlockSet, ReplayError, ReplayResult};
pub use ports::BlockSetStore;
pub use service::rebuild_chain_heads;
