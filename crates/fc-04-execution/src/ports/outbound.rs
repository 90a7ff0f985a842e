//! Driven ports (outbound dependencies)

use fc_02_messages::MissingMsgResponse;
use shared_types::Timestamp;

/// Wall clock used for drift checks and heartbeat stamps.
pub trait TimeSource: Send + Sync {
    /// Current time.
    fn now(&self) -> Timestamp;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Ledger replay for missing-message responses.
///
/// The core only routes responses here; replaying the contained message
/// against the ledger happens outside it.
pub trait MissingMessageHandler: Send + Sync {
    fn replay(&self, response: &MissingMsgResponse) -> Result<(), String>;
}
