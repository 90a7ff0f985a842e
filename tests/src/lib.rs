//! # Federated Consensus Core Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── core_benchmarks.rs   # Heartbeat encode / decode / validate
//! └── src/integration/         # Cross-crate scenarios
//!     ├── heartbeat_flow.rs    # Wire → processor → registry
//!     ├── registry_flow.rs     # Key rotation, snapshot/restore
//!     ├── election_flow.rs     # Independent nodes elect the same leader
//!     └── replay_flow.rs       # Chain-head rebuild
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fc-tests
//! RUST_LOG=debug cargo test -p fc-tests integration::election_flow
//! cargo bench -p fc-tests
//! ```

#![allow(dead_code)]

pub mod integration;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
