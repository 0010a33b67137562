//! Loading relocated CSV files into the price store.
//!
//! Files follow the canonical naming `[Day_|Hour_]<instrument>_<YYYYMM00>.csv`
//! in the `_conv` directory. Every file is decoded with the vendor profile's
//! CSV layout and the instrument's price multiplier, then merged into the
//! store. Any error aborts the call; contracts already written stay written.

use futconv_core::config::{CsvConfigError, VendorProfile};
use futconv_core::data::{read_price_csv, CsvPriceError, PriceStore, StorageError, WriteOutcome};
use futconv_core::domain::{CanonicalPriceFile, ContractError, ContractKey, PriceFrequency};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot list {dir}: {source}")]
    Listing {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("no daily price file for {contract} in {dir}")]
    NoContractFile { contract: String, dir: PathBuf },

    #[error("{file}: {source}")]
    Csv { file: PathBuf, source: CsvPriceError },

    #[error("CSV config: {0}")]
    Config(#[from] CsvConfigError),

    #[error("contract: {0}")]
    Contract(#[from] ContractError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

/// One file written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedContract {
    pub key: ContractKey,
    pub frequency: PriceFrequency,
    pub file: PathBuf,
    pub rows_read: usize,
    pub outcome: WriteOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub loaded: Vec<LoadedContract>,
    /// Files that decoded to zero rows and were not written.
    pub empty_files: Vec<PathBuf>,
}

impl LoadSummary {
    pub fn rows_added(&self) -> usize {
        self.loaded.iter().map(|c| c.outcome.rows_added).sum()
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.loaded {
            writeln!(
                f,
                "{} [{}]: {} rows read, {} new, {} stored",
                c.key, c.frequency, c.rows_read, c.outcome.rows_added, c.outcome.total_rows
            )?;
        }
        for path in &self.empty_files {
            writeln!(f, "{}: no rows, skipped", path.display())?;
        }
        writeln!(
            f,
            "Loaded {} file(s), {} new row(s)",
            self.loaded.len(),
            self.rows_added()
        )
    }
}

/// Daily file for a contract: `Day_` first, then the unprefixed file.
pub(crate) fn daily_file_for(dir: &Path, key: &ContractKey) -> Option<PathBuf> {
    [PriceFrequency::Daily, PriceFrequency::Mixed]
        .into_iter()
        .map(|freq| dir.join(freq.file_name(key)))
        .find(|path| path.is_file())
}

pub struct PriceLoader<'a, S: PriceStore + ?Sized> {
    store: &'a S,
    profile: &'a VendorProfile,
}

impl<'a, S: PriceStore + ?Sized> PriceLoader<'a, S> {
    pub fn new(store: &'a S, profile: &'a VendorProfile) -> Self {
        Self { store, profile }
    }

    /// Every canonical file in `dir`, all instruments and frequencies.
    pub fn load_directory(&self, dir: &Path) -> Result<LoadSummary, LoadError> {
        let files = list_canonical_files(dir)?;
        info!(dir = %dir.display(), files = files.len(), "loading directory");
        self.load_files(dir, &files)
    }

    /// Files of exactly `instrument` (`Day_`, `Hour_` or unprefixed).
    pub fn load_instrument(&self, instrument: &str, dir: &Path) -> Result<LoadSummary, LoadError> {
        let files: Vec<CanonicalPriceFile> = list_canonical_files(dir)?
            .into_iter()
            .filter(|f| f.key.instrument == instrument)
            .collect();
        info!(instrument, files = files.len(), "loading instrument");
        self.load_files(dir, &files)
    }

    /// One contract's daily series.
    pub fn load_contract(
        &self,
        instrument: &str,
        contract_date: &str,
        dir: &Path,
    ) -> Result<LoadSummary, LoadError> {
        let key = ContractKey::from_date_str(instrument, contract_date)?;
        let path = daily_file_for(dir, &key).ok_or_else(|| LoadError::NoContractFile {
            contract: key.to_string(),
            dir: dir.to_path_buf(),
        })?;

        let mut summary = LoadSummary::default();
        self.load_file(&path, &key, PriceFrequency::Daily, &mut summary)?;
        Ok(summary)
    }

    fn load_files(&self, dir: &Path, files: &[CanonicalPriceFile]) -> Result<LoadSummary, LoadError> {
        let mut summary = LoadSummary::default();
        for file in files {
            let path = dir.join(file.file_name());
            self.load_file(&path, &file.key, file.frequency, &mut summary)?;
        }
        Ok(summary)
    }

    fn load_file(
        &self,
        path: &Path,
        key: &ContractKey,
        frequency: PriceFrequency,
        summary: &mut LoadSummary,
    ) -> Result<(), LoadError> {
        let config = self.profile.csv_config_for(&key.instrument)?;
        let series = read_price_csv(path, &config, frequency).map_err(|source| LoadError::Csv {
            file: path.to_path_buf(),
            source,
        })?;

        if series.is_empty() {
            warn!(file = %path.display(), contract = %key, "no rows, skipping");
            summary.empty_files.push(path.to_path_buf());
            return Ok(());
        }

        let outcome = self.store.write_prices(key, frequency, &series)?;
        info!(
            contract = %key,
            frequency = %frequency,
            multiplier = config.multiplier(),
            rows = series.len(),
            added = outcome.rows_added,
            "wrote prices"
        );

        summary.loaded.push(LoadedContract {
            key: key.clone(),
            frequency,
            file: path.to_path_buf(),
            rows_read: series.len(),
            outcome,
        });
        Ok(())
    }
}

/// Canonical price files in `dir`, sorted by file name. Other files are ignored.
fn list_canonical_files(dir: &Path) -> Result<Vec<CanonicalPriceFile>, LoadError> {
    let listing_err = |source| LoadError::Listing {
        dir: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(listing_err)? {
        let path = entry.map_err(listing_err)?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();

    Ok(names
        .iter()
        .filter_map(|name| match CanonicalPriceFile::parse(name) {
            Ok(file) => Some(file),
            Err(_) => {
                debug!(file = %name, "not a canonical price file, ignored");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futconv_core::data::ParquetPriceStore;

    const DAILY: &str = "\
Date,Open,High,Low,Close,Volume
2024-06-26,210.5,212.0,209.0,211.25,1500
2024-06-27,211.0,213.5,210.5,213.00,1720
";

    const HOURLY: &str = "\
Date,Open,High,Low,Close,Volume
2024-06-27 14:00:00,211.0,211.5,210.8,211.4,120
";

    #[test]
    fn daily_file_prefers_day_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let key = ContractKey::new("GOLD", 2024, 8).unwrap();
        assert!(daily_file_for(tmp.path(), &key).is_none());

        fs::write(tmp.path().join("GOLD_20240800.csv"), DAILY).unwrap();
        assert_eq!(
            daily_file_for(tmp.path(), &key).unwrap(),
            tmp.path().join("GOLD_20240800.csv")
        );

        fs::write(tmp.path().join("Day_GOLD_20240800.csv"), DAILY).unwrap();
        assert_eq!(
            daily_file_for(tmp.path(), &key).unwrap(),
            tmp.path().join("Day_GOLD_20240800.csv")
        );
    }

    #[test]
    fn listing_ignores_non_canonical_names() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["GOLD_20240800.csv", "ES-2011U.csv", "readme.md", "Hour_GOLD_20240800.csv"] {
            fs::write(tmp.path().join(name), "").unwrap();
        }
        let files = list_canonical_files(tmp.path()).unwrap();
        let names: Vec<String> = files.iter().map(CanonicalPriceFile::file_name).collect();
        assert_eq!(names, vec!["GOLD_20240800.csv", "Hour_GOLD_20240800.csv"]);
    }

    #[test]
    fn empty_files_are_skipped_not_written() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("conv");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("GOLD_20240800.csv"), "Date,Open,High,Low,Close,Volume\n").unwrap();

        let store = ParquetPriceStore::new(tmp.path().join("store"));
        let profile = VendorProfile::norgate();
        let summary = PriceLoader::new(&store, &profile)
            .load_directory(&data)
            .unwrap();
        assert!(summary.loaded.is_empty());
        assert_eq!(summary.empty_files.len(), 1);
        assert!(store.contracts_for_instrument("GOLD").unwrap().is_empty());
    }

    #[test]
    fn zero_byte_file_is_reported_empty_and_load_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("conv");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("GOLD_20240800.csv"), "").unwrap();
        fs::write(data.join("GOLD_20241200.csv"), DAILY).unwrap();

        let store = ParquetPriceStore::new(tmp.path().join("store"));
        let profile = VendorProfile::norgate();
        let summary = PriceLoader::new(&store, &profile)
            .load_directory(&data)
            .unwrap();
        assert_eq!(summary.empty_files, vec![data.join("GOLD_20240800.csv")]);
        assert_eq!(summary.loaded.len(), 1);
        assert_eq!(summary.loaded[0].key, ContractKey::new("GOLD", 2024, 12).unwrap());
    }

    #[test]
    fn hourly_files_load_under_hourly_frequency() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("conv");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("Hour_GOLD_20240800.csv"), HOURLY).unwrap();

        let store = ParquetPriceStore::new(tmp.path().join("store"));
        let profile = VendorProfile::norgate();
        let summary = PriceLoader::new(&store, &profile)
            .load_instrument("GOLD", &data)
            .unwrap();
        assert_eq!(summary.loaded.len(), 1);
        assert_eq!(summary.loaded[0].frequency, PriceFrequency::Hourly);

        let key = ContractKey::new("GOLD", 2024, 8).unwrap();
        assert_eq!(store.get_prices(&key, PriceFrequency::Hourly).unwrap().len(), 1);
    }

    #[test]
    fn instrument_with_daily_and_hourly_files_loads_both() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("conv");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("Day_GOLD_20240800.csv"), DAILY).unwrap();
        fs::write(data.join("Hour_GOLD_20240800.csv"), HOURLY).unwrap();

        let store = ParquetPriceStore::new(tmp.path().join("store"));
        let profile = VendorProfile::norgate();
        let summary = PriceLoader::new(&store, &profile)
            .load_instrument("GOLD", &data)
            .unwrap();
        let mut frequencies: Vec<PriceFrequency> =
            summary.loaded.iter().map(|l| l.frequency).collect();
        frequencies.sort_by_key(|f| f.tag());
        assert_eq!(frequencies, vec![PriceFrequency::Daily, PriceFrequency::Hourly]);

        let key = ContractKey::new("GOLD", 2024, 8).unwrap();
        let daily = store.get_prices(&key, PriceFrequency::Daily).unwrap();
        assert_eq!(daily.first().unwrap().timestamp.to_string(), "2024-06-26 23:00:00");
        let hourly = store.get_prices(&key, PriceFrequency::Hourly).unwrap();
        assert_eq!(hourly.first().unwrap().timestamp.to_string(), "2024-06-27 14:00:00");
    }
}
