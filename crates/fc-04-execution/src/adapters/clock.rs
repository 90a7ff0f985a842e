//! Settable clock for simulations and tests.

use crate::ports::TimeSource;
use parking_lot::RwLock;
use shared_types::Timestamp;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.write() = now;
    }

    pub fn advance_secs(&self, secs: u64) {
        let mut now = self.now.write();
        *now = Timestamp::from_millis(now.millis() + secs * 1000);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }
}
