//! Configuration readiness checks for canonical instruments.
//!
//! An instrument is ready for relocation only when the instrument store has a
//! well-formed metadata row for it and the roll store has roll parameters.

use futconv_core::config::{ConfigStoreError, InstrumentSource, RollCalendarSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Outcome of validating one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigStatus {
    Configured,
    /// Metadata is absent or incomplete; roll parameters exist.
    Misconfigured,
    /// Roll parameters are absent (regardless of metadata).
    NoRollConfig,
}

impl fmt::Display for ConfigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigStatus::Configured => "configured",
            ConfigStatus::Misconfigured => "misconfigured",
            ConfigStatus::NoRollConfig => "no roll config",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("instrument store lookup for '{instrument}' failed: {source}")]
    InstrumentStore {
        instrument: String,
        source: ConfigStoreError,
    },

    #[error("roll store lookup for '{instrument}' failed: {source}")]
    RollStore {
        instrument: String,
        source: ConfigStoreError,
    },
}

/// Checks instruments against the two configuration stores.
pub struct ConfigValidator<'a> {
    instruments: &'a dyn InstrumentSource,
    rolls: &'a dyn RollCalendarSource,
}

impl<'a> ConfigValidator<'a> {
    pub fn new(instruments: &'a dyn InstrumentSource, rolls: &'a dyn RollCalendarSource) -> Self {
        Self { instruments, rolls }
    }

    /// Both stores are always queried. A missing roll config takes
    /// precedence over missing or incomplete metadata.
    pub fn validate(&self, instrument: &str) -> Result<ConfigStatus, ValidationError> {
        let metadata = self
            .instruments
            .get_instrument(instrument)
            .map_err(|source| ValidationError::InstrumentStore {
                instrument: instrument.to_string(),
                source,
            })?;
        let has_roll = self
            .rolls
            .has_roll_config(instrument)
            .map_err(|source| ValidationError::RollStore {
                instrument: instrument.to_string(),
                source,
            })?;

        let metadata_ok = metadata.as_ref().is_some_and(|m| m.is_well_formed());

        Ok(match (metadata_ok, has_roll) {
            (_, false) => ConfigStatus::NoRollConfig,
            (false, true) => ConfigStatus::Misconfigured,
            (true, true) => ConfigStatus::Configured,
        })
    }
}
