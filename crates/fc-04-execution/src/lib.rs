//! # fc-04-execution
//!
//! Execution driver for the consensus-message core.
//!
//! ## Architecture
//!
//! ```text
//! bytes ──decode──→ Message ──┐
//!                             ├─ validate (rayon pool, read-only)
//!                             │     Invalid → dropped
//!                             │     Pending → retry queue (bounded)
//!                             │     Valid ↓
//!                             ├─ lane = compute_vm_index % lanes
//!                             │
//!        lane 0 ─┐  lane 1 ─┐  lane n ─┐     (parallel across lanes)
//!        serial  │  serial  │  serial  │     (one ProcessList lock each)
//!                             │
//!                             └─ election messages → ElectionAdapter
//!                                   follow-ups fed back locally
//!                                   block closed → lanes reset, height + 1
//! ```
//!
//! ## Failure Model
//!
//! Validation outcomes are never errors. Decode failures surface to the
//! caller. A heartbeat impersonating the local identity is an integrity
//! violation: the node moves to `HaltedAwaitingIntervention` and refuses
//! work until `resume_after_intervention` is called.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fc_04_execution::{CoreConfig, MessageProcessor, ProcessorDependencies};
//!
//! let processor = MessageProcessor::new(ProcessorDependencies {
//!     registry,
//!     identity_chain_id,
//!     signing_key,
//!     salt_secret,
//!     replay,
//!     config: CoreConfig::default(),
//!     leader_height: 1,
//! })?;
//!
//! let report = processor.process_batch(messages)?;
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;

pub use config::{ConfigError, CoreConfig, ElectionConfig, ExecutionConfig, ValidationConfig};
pub use error::{ProcessorError, ProcessorResult};
pub use ports::{MissingMessageHandler, SystemTimeSource, TimeSource};
pub use service::{BatchReport, MessageProcessor, ProcessorDependencies};
pub use state::LocalState;
