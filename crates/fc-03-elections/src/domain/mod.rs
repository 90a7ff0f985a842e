//! Domain layer: election rounds and the roster state machine.

pub mod election;
pub mod error;
pub mod state;

pub use election::{Election, ElectionPhase};
pub use error::{ElectionError, ElectionResult};
pub use state::{Elections, Transition};
