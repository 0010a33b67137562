//! futconv runner: the vendor import pipeline.
//!
//! This crate builds on `futconv-core` to provide:
//! - Configuration readiness checks against the instrument and roll stores
//! - Relocation of vendor files to canonical names in `<source>_conv`
//! - The batch orchestrator that classifies and renames a download directory
//! - Loading relocated CSV files into the price store
//! - Stored-vs-vendor price comparison for one contract
//! - Process settings (`futconv.toml`)

pub mod checker;
pub mod loader;
pub mod orchestrator;
pub mod relocator;
pub mod settings;
pub mod validator;

pub use checker::{CheckError, ConsistencyChecker, PriceComparison};
pub use loader::{LoadError, LoadSummary, LoadedContract, PriceLoader};
pub use orchestrator::{BatchError, BatchOrchestrator, BatchReport, ClassificationBuckets, FileFailure};
pub use relocator::{conv_dir_for, FileRelocator, Relocation, RelocationError};
pub use settings::{Settings, SettingsError, DEFAULT_SETTINGS_FILE};
pub use validator::{ConfigStatus, ConfigValidator, ValidationError};
