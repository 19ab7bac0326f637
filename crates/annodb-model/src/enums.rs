//! Type tags shared by formal arguments, data values and matrix schemas.
//!
//! The tag names are part of the debug grammar (`(itsFargType INTEGER)`,
//! `(type: MATRIX)`), so `as_str` must stay stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Formal argument type tag.
///
/// A data value caches the tag of the formal argument it instantiates; the
/// two must agree after every cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FargType {
    Undefined,
    ColPredicate,
    Integer,
    Float,
    Nominal,
    Predicate,
    QuoteString,
    TimeStamp,
    Text,
    Untyped,
}

impl FargType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FargType::Undefined => "UNDEFINED",
            FargType::ColPredicate => "COL_PREDICATE",
            FargType::Integer => "INTEGER",
            FargType::Float => "FLOAT",
            FargType::Nominal => "NOMINAL",
            FargType::Predicate => "PREDICATE",
            FargType::QuoteString => "QUOTE_STRING",
            FargType::TimeStamp => "TIME_STAMP",
            FargType::Text => "TEXT",
            FargType::Untyped => "UNTYPED",
        }
    }
}

impl fmt::Display for FargType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FargType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UNDEFINED" => Ok(FargType::Undefined),
            "COL_PREDICATE" => Ok(FargType::ColPredicate),
            "INTEGER" => Ok(FargType::Integer),
            "FLOAT" => Ok(FargType::Float),
            "NOMINAL" => Ok(FargType::Nominal),
            "PREDICATE" => Ok(FargType::Predicate),
            "QUOTE_STRING" => Ok(FargType::QuoteString),
            "TIME_STAMP" => Ok(FargType::TimeStamp),
            "TEXT" => Ok(FargType::Text),
            "UNTYPED" => Ok(FargType::Untyped),
            _ => Err(format!("Unknown formal argument type: {s}")),
        }
    }
}

/// Shape of a matrix vocabulary element.
///
/// Every kind except `Matrix` holds exactly one formal argument of the
/// matching type. `Undefined` is the state before `set_type` is called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixType {
    #[default]
    Undefined,
    Text,
    Nominal,
    Integer,
    Float,
    Predicate,
    Matrix,
}

impl MatrixType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixType::Undefined => "UNDEFINED",
            MatrixType::Text => "TEXT",
            MatrixType::Nominal => "NOMINAL",
            MatrixType::Integer => "INTEGER",
            MatrixType::Float => "FLOAT",
            MatrixType::Predicate => "PREDICATE",
            MatrixType::Matrix => "MATRIX",
        }
    }

    /// The only formal argument type a single-argument matrix may hold.
    ///
    /// Returns `None` for `Matrix` (any type but text) and `Undefined`.
    pub fn required_farg_type(&self) -> Option<FargType> {
        match self {
            MatrixType::Text => Some(FargType::Text),
            MatrixType::Nominal => Some(FargType::Nominal),
            MatrixType::Integer => Some(FargType::Integer),
            MatrixType::Float => Some(FargType::Float),
            MatrixType::Predicate => Some(FargType::Predicate),
            MatrixType::Matrix | MatrixType::Undefined => None,
        }
    }

    /// True if a formal argument of `farg_type` may be added to this matrix.
    pub fn accepts(&self, farg_type: FargType) -> bool {
        match self {
            MatrixType::Undefined => false,
            MatrixType::Matrix => farg_type != FargType::Text,
            other => other.required_farg_type() == Some(farg_type),
        }
    }
}

impl fmt::Display for MatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatrixType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UNDEFINED" => Ok(MatrixType::Undefined),
            "TEXT" => Ok(MatrixType::Text),
            "NOMINAL" => Ok(MatrixType::Nominal),
            "INTEGER" => Ok(MatrixType::Integer),
            "FLOAT" => Ok(MatrixType::Float),
            "PREDICATE" => Ok(MatrixType::Predicate),
            "MATRIX" => Ok(MatrixType::Matrix),
            _ => Err(format!("Unknown matrix type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farg_type_tags_round_trip() {
        for tag in [
            FargType::Undefined,
            FargType::ColPredicate,
            FargType::Integer,
            FargType::Float,
            FargType::Nominal,
            FargType::Predicate,
            FargType::QuoteString,
            FargType::TimeStamp,
            FargType::Text,
            FargType::Untyped,
        ] {
            assert_eq!(tag.as_str().parse::<FargType>(), Ok(tag));
        }
        assert!("bogus".parse::<FargType>().is_err());
    }

    #[test]
    fn matrix_type_acceptance() {
        assert!(MatrixType::Matrix.accepts(FargType::Integer));
        assert!(MatrixType::Matrix.accepts(FargType::Untyped));
        assert!(!MatrixType::Matrix.accepts(FargType::Text));
        assert!(MatrixType::Text.accepts(FargType::Text));
        assert!(!MatrixType::Integer.accepts(FargType::Float));
        assert!(!MatrixType::Undefined.accepts(FargType::Integer));
        assert_eq!(MatrixType::default(), MatrixType::Undefined);
    }
}
