//! Process settings (`futconv.toml`).
//!
//! ```toml
//! store_root = "data/prices"
//! instrument_config = "config/instrumentconfig.csv"
//! roll_config = "config/rollconfig.csv"
//! profile = "norgate"
//! # profile_file = "profiles/acme.toml"
//! ```
//!
//! Every key is optional. `profile_file`, when set, takes precedence over
//! the preset named by `profile`.

use futconv_core::config::{
    ConfigStoreError, CsvInstrumentConfig, CsvRollConfig, ProfileError, VendorProfile,
};
use futconv_core::data::ParquetPriceStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_SETTINGS_FILE: &str = "futconv.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("read settings {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("vendor profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("configuration store: {0}")]
    Store(#[from] ConfigStoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store_root: PathBuf,
    pub instrument_config: PathBuf,
    pub roll_config: PathBuf,
    /// Built-in profile name.
    pub profile: String,
    /// Profile TOML; overrides `profile`.
    pub profile_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("data/prices"),
            instrument_config: PathBuf::from("config/instrumentconfig.csv"),
            roll_config: PathBuf::from("config/rollconfig.csv"),
            profile: "norgate".into(),
            profile_file: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `futconv.toml` in the working
    /// directory when no path is given. A missing default file means
    /// defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    debug!("no {DEFAULT_SETTINGS_FILE}, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn vendor_profile(&self) -> Result<VendorProfile, SettingsError> {
        let profile = match &self.profile_file {
            Some(path) => VendorProfile::from_file(path)?,
            None => VendorProfile::preset(&self.profile)?,
        };
        Ok(profile)
    }

    pub fn instrument_store(&self) -> Result<CsvInstrumentConfig, SettingsError> {
        Ok(CsvInstrumentConfig::from_path(&self.instrument_config)?)
    }

    pub fn roll_store(&self) -> Result<CsvRollConfig, SettingsError> {
        Ok(CsvRollConfig::from_path(&self.roll_config)?)
    }

    pub fn price_store(&self) -> ParquetPriceStore {
        ParquetPriceStore::new(&self.store_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_toml_overrides_named_keys() {
        let s = Settings::from_toml("store_root = \"/srv/prices\"\nprofile = \"norgate-compact\"\n")
            .unwrap();
        assert_eq!(s.store_root, PathBuf::from("/srv/prices"));
        assert_eq!(s.roll_config, Settings::default().roll_config);
        assert_eq!(s.vendor_profile().unwrap().name, "norgate-compact");
    }

    #[test]
    fn unknown_preset_is_reported() {
        let s = Settings {
            profile: "refinitiv".into(),
            ..Settings::default()
        };
        assert!(matches!(
            s.vendor_profile(),
            Err(SettingsError::Profile(ProfileError::UnknownPreset(_)))
        ));
    }

    #[test]
    fn profile_file_wins_over_preset() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("acme.toml");
        std::fs::write(&path, "name = \"acme\"\n[mapping]\nAC = \"ACME\"\n").unwrap();
        let s = Settings {
            profile: "refinitiv".into(),
            profile_file: Some(path),
            ..Settings::default()
        };
        let p = s.vendor_profile().unwrap();
        assert_eq!(p.name, "acme");
        assert_eq!(p.mapping.translate("AC"), Some("ACME"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/definitely/not/futconv.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
