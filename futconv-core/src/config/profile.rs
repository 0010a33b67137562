//! Vendor profiles: everything that differs between two vendor integrations.
//!
//! A profile bundles the CSV layout, the vendor code mapping and the price
//! multipliers. Built-in presets cover Norgate Data; other vendors are
//! described in a TOML file:
//!
//! ```toml
//! name = "acme"
//!
//! [csv]
//! date_format = "%Y%m%d"
//!
//! [mapping]
//! ES = "SP500"
//!
//! [multipliers]
//! COFFEE = 0.01
//! ```

use super::csv_price::{CsvConfigError, CsvPriceConfig};
use crate::tables::{CodeMapping, MultiplierTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("read profile {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse profile TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown profile '{0}' (built-in: norgate, norgate-compact)")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorProfile {
    pub name: String,
    #[serde(default)]
    pub csv: CsvPriceConfig,
    #[serde(default)]
    pub mapping: CodeMapping,
    #[serde(default)]
    pub multipliers: MultiplierTable,
}

impl VendorProfile {
    pub const PRESETS: [&'static str; 2] = ["norgate", "norgate-compact"];

    /// Norgate Data: ISO dates, Norgate market codes, cents-quoted markets rescaled.
    pub fn norgate() -> Self {
        Self {
            name: "norgate".into(),
            csv: CsvPriceConfig::iso_daily(),
            mapping: CodeMapping::norgate(),
            multipliers: MultiplierTable::norgate(),
        }
    }

    /// Norgate exports written with compact `YYYYMMDD` dates.
    pub fn norgate_compact() -> Self {
        Self {
            name: "norgate-compact".into(),
            csv: CsvPriceConfig::compact_daily(),
            ..Self::norgate()
        }
    }

    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        match name {
            "norgate" => Ok(Self::norgate()),
            "norgate-compact" => Ok(Self::norgate_compact()),
            other => Err(ProfileError::UnknownPreset(other.to_string())),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ProfileError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ProfileError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn multiplier_for(&self, instrument: &str) -> f64 {
        self.multipliers.resolve(instrument)
    }

    /// The profile's CSV config with `instrument`'s multiplier applied.
    pub fn csv_config_for(&self, instrument: &str) -> Result<CsvPriceConfig, CsvConfigError> {
        self.csv.with_multiplier(self.multiplier_for(instrument))
    }
}
