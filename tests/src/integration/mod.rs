//! Cross-crate scenarios.

pub mod election_flow;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod heartbeat_flow;
pub mod registry_flow;
pub mod replay_flow;
