//! Database-wide configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SystemError};
use crate::timestamp::{DEFAULT_TPS, MAX_TPS, MIN_TPS};

/// Options applied when a database is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    /// Tick rate for new cell onsets/offsets and for salvaging integers
    /// into time stamps.
    pub tps: u32,

    /// Database name.
    pub name: String,

    /// Free-form description.
    pub description: Option<String>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            tps: DEFAULT_TPS,
            name: "Undefined".to_string(),
            description: None,
        }
    }
}

impl DatabaseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tps(mut self, tps: u32) -> Self {
        self.tps = tps;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_TPS..=MAX_TPS).contains(&self.tps) {
            return Err(SystemError::tick_rate(
                "DatabaseOptions::validate()",
                format!("tps {} out of range [{MIN_TPS}, {MAX_TPS}]", self.tps),
            ));
        }
        Ok(())
    }
}
