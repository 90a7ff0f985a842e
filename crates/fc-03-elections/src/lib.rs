//! # fc-03-elections
//!
//! Replaces an unresponsive lane leader with an audit server without a
//! separate consensus round.
//!
//! ## Architecture
//!
//! - [`domain::Elections`]: pure state machine over the roster, the minute
//!   barrier and the running election. Applying a message yields a
//!   [`domain::Transition`]: an optional follow-up payload plus registry
//!   status changes.
//! - [`ElectionAdapter`]: owns one node's `Elections`, applies status
//!   changes to the shared registry and wraps follow-ups into messages.
//! - [`ElectionsFactory`]: builds election-internal messages and adapters.
//!
//! Election messages are internal: nodes derive them locally from the same
//! inputs and never relay them. Candidate order and tie-breaks use chain-ID
//! order, so every node that sees the same messages elects the same server.

pub mod adapter;
pub mod domain;
pub mod factory;

pub use adapter::ElectionAdapter;
pub use domain::{Election, ElectionError, ElectionPhase, ElectionResult, Elections, Transition};
pub use factory::ElectionsFactory;
