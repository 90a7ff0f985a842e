//! Ports consumed by the message layer.

pub mod state;

pub use state::StateView;
