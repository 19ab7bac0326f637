//! Result types shared between the library half and the binary.

use annodb_core::{Database, MatrixType, TimeStamp};
use clap::ValueEnum;

/// The lexical rule `check-name` applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NameKind {
    /// `<name>` formal argument names.
    Farg,
    Nominal,
    /// Predicate vocabulary element names.
    Predicate,
    /// Column (matrix vocabulary element) names.
    Column,
    QuoteString,
    Text,
}

impl NameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NameKind::Farg => "formal argument",
            NameKind::Nominal => "nominal",
            NameKind::Predicate => "predicate",
            NameKind::Column => "column",
            NameKind::QuoteString => "quote string",
            NameKind::Text => "text",
        }
    }
}

/// One column as seen at a point in the demo run.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub mtype: MatrixType,
    pub num_fargs: usize,
    pub num_listeners: usize,
    /// Display form of each cell, in ord order.
    pub cells: Vec<String>,
}

#[derive(Debug)]
pub struct DemoRun {
    pub db: Database,
    pub before: Vec<ColumnSummary>,
    pub after: Vec<ColumnSummary>,
    /// Human readable description of each applied edit.
    pub edits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimestampReport {
    pub parsed: TimeStamp,
    pub converted: Option<TimeStamp>,
}
