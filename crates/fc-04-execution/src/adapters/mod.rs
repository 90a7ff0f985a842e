//! Adapters for outbound ports.

pub mod clock;
pub mod replay;

pub use clock::ManualClock;
pub use replay::RecordingReplayHandler;
