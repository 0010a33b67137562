//! Configuration: vendor profiles, CSV layouts and the instrument/roll stores.

pub mod csv_price;
pub mod instrument;
pub mod profile;
pub mod roll;

pub use csv_price::{ColumnMapping, CsvConfigError, CsvPriceConfig, CsvPriceConfigBuilder};
pub use instrument::{CsvInstrumentConfig, InstrumentMetadata, InstrumentSource};
pub use profile::{ProfileError, VendorProfile};
pub use roll::{CsvRollConfig, RollCalendarSource, RollParameters};

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading a configuration store.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("config store unavailable: {0}")]
    Unavailable(String),
}
