//! Ports for the execution driver.

pub mod outbound;

pub use outbound::{MissingMessageHandler, SystemTimeSource, TimeSource};
