//! Block-set model and replay errors.

pub mod block_set;
pub mod error;

pub use block_set::{BlockRef, BlockSet};
pub use error::{ReplayError, ReplayResult};
