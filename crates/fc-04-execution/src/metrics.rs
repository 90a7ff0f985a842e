//! # Execution Metrics
//!
//! Prometheus metrics for the execution driver.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! fc-04-execution = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `core_validation_results_total` - Validation outcomes (by outcome)
//! - `core_messages_executed_total` - Executed messages (by role)
//! - `core_duplicates_skipped_total` - Duplicate deliveries skipped
//! - `core_elections_completed_total` - Leader replacements finished
//! - `core_integrity_violations_total` - Integrity faults that halted the node

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

use fc_02_messages::Validity;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Validation outcomes, labeled invalid/pending/valid
    pub static ref VALIDATION_RESULTS: IntCounterVec = register_int_counter_vec!(
        "core_validation_results_total",
        "Total message validation outcomes",
        &["outcome"]
    )
    .expect("Failed to create VALIDATION_RESULTS metric");

    /// Executed messages, labeled leader/follower
    pub static ref MESSAGES_EXECUTED: IntCounterVec = register_int_counter_vec!(
        "core_messages_executed_total",
        "Total messages executed",
        &["role"]
    )
    .expect("Failed to create MESSAGES_EXECUTED metric");

    pub static ref DUPLICATES_SKIPPED: IntCounter = register_int_counter!(
        "core_duplicates_skipped_total",
        "Total duplicate deliveries skipped"
    )
    .expect("Failed to create DUPLICATES_SKIPPED metric");

    pub static ref ELECTIONS_COMPLETED: IntCounter = register_int_counter!(
        "core_elections_completed_total",
        "Total leader elections completed"
    )
    .expect("Failed to create ELECTIONS_COMPLETED metric");

    pub static ref INTEGRITY_VIOLATIONS: IntCounter = register_int_counter!(
        "core_integrity_violations_total",
        "Total integrity violations"
    )
    .expect("Failed to create INTEGRITY_VIOLATIONS metric");
}

fn outcome_label(validity: Validity) -> &'static str {
    match validity {
        Validity::Invalid => "invalid",
        Validity::Pending => "pending",
        Validity::Valid => "valid",
    }
}

#[cfg(feature = "metrics")]
pub fn record_validation(validity: Validity) {
    VALIDATION_RESULTS
        .with_label_values(&[outcome_label(validity)])
        .inc();
}

#[cfg(feature = "metrics")]
pub fn record_executed(as_leader: bool) {
    let role = if as_leader { "leader" } else { "follower" };
    MESSAGES_EXECUTED.with_label_values(&[role]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_duplicate() {
    DUPLICATES_SKIPPED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_election_completed() {
    ELECTIONS_COMPLETED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_integrity_violation() {
    INTEGRITY_VIOLATIONS.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_validation(validity: Validity) {
    let _ = outcome_label(validity);
}

#[cfg(not(feature = "metrics"))]
pub fn record_executed(_as_leader: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_duplicate() {}

#[cfg(not(feature = "metrics"))]
pub fn record_election_completed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_integrity_violation() {}
