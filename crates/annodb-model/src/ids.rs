use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SystemError};

/// Database-assigned element identifier.
///
/// Ids are handed out by the index starting at 1; `DbId::INVALID` (0) marks an
/// element that has not been inserted yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DbId(u64);

impl DbId {
    pub const INVALID: DbId = DbId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns `self` or an `InvalidId` error naming `context`.
    pub fn require_valid(self, context: &'static str) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(SystemError::InvalidId { context })
        }
    }
}

impl From<u64> for DbId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for DbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_is_zero() {
        assert_eq!(DbId::INVALID.get(), 0);
        assert!(!DbId::INVALID.is_valid());
        assert!(DbId::new(7).is_valid());
        assert_eq!(DbId::default(), DbId::INVALID);
    }

    #[test]
    fn require_valid_reports_context() {
        let err = DbId::INVALID.require_valid("Predicate::new()").unwrap_err();
        assert_eq!(err.context(), "Predicate::new()");
        assert_eq!(DbId::new(3).require_valid("x").unwrap(), DbId::new(3));
    }
}
