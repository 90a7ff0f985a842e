//! Tri-state validation outcome.

use std::fmt;

/// Result of validating a message against local state.
///
/// `Invalid` and `Pending` are ordinary outcomes, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validity {
    /// Discard this instance.
    Invalid,
    /// Cannot decide yet; hold and retry later.
    Pending,
    /// Proceed to execution.
    Valid,
}

impl Validity {
    /// Numeric form: -1, 0 or 1.
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Invalid => -1,
            Self::Pending => 0,
            Self::Valid => 1,
        }
    }

    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}
