use thiserror::Error;

use crate::ids::DbId;

/// Invariant violation raised anywhere in the database model.
///
/// Every variant carries the `Component::method()` that detected the problem.
/// None of these are expected run-time conditions: a caller that receives one
/// in the middle of an edit must abandon the edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemError {
    #[error("{context}: invalid id")]
    InvalidId { context: &'static str },

    #[error("{context}: no element with id {id}")]
    NotFound { context: &'static str, id: DbId },

    #[error("{context}: type mismatch (expected {expected}, found {found})")]
    TypeMismatch {
        context: &'static str,
        expected: String,
        found: String,
    },

    #[error("{context}: index {index} out of bounds (len {len})")]
    OutOfBounds {
        context: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{context}: attempt to modify a system vocab element")]
    SystemElement { context: &'static str },

    #[error("{context}: invalid name {name:?}")]
    InvalidName { context: &'static str, name: String },

    #[error("{context}: {reason}")]
    TickRate {
        context: &'static str,
        reason: String,
    },

    #[error("{context}: {reason}")]
    Invariant {
        context: &'static str,
        reason: String,
    },
}

impl SystemError {
    pub fn invariant(context: &'static str, reason: impl Into<String>) -> Self {
        Self::Invariant {
            context,
            reason: reason.into(),
        }
    }

    pub fn tick_rate(context: &'static str, reason: impl Into<String>) -> Self {
        Self::TickRate {
            context,
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(
        context: &'static str,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::TypeMismatch {
            context,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn invalid_name(context: &'static str, name: impl Into<String>) -> Self {
        Self::InvalidName {
            context,
            name: name.into(),
        }
    }

    /// The `Component::method()` that raised the error.
    pub fn context(&self) -> &'static str {
        match self {
            Self::InvalidId { context }
            | Self::NotFound { context, .. }
            | Self::TypeMismatch { context, .. }
            | Self::OutOfBounds { context, .. }
            | Self::SystemElement { context }
            | Self::InvalidName { context, .. }
            | Self::TickRate { context, .. }
            | Self::Invariant { context, .. } => context,
        }
    }
}

pub type Result<T> = std::result::Result<T, SystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_component() {
        let err = SystemError::invariant("Cell::setOrd()", "newOrd < 1");
        assert_eq!(err.to_string(), "Cell::setOrd(): newOrd < 1");
        assert_eq!(err.context(), "Cell::setOrd()");
    }

    #[test]
    fn out_of_bounds_message() {
        let err = SystemError::OutOfBounds {
            context: "VocabElement::deleteFormalArg()",
            index: 3,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "VocabElement::deleteFormalArg(): index 3 out of bounds (len 2)"
        );
    }
}
