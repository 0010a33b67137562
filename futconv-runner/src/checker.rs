//! Side-by-side view of stored and vendor prices for one contract.
//!
//! Read-only. The comparison is for a human to eyeball; nothing is diffed
//! or reconciled.

use crate::loader::daily_file_for;
use futconv_core::config::{CsvConfigError, VendorProfile};
use futconv_core::data::{read_price_csv, CsvPriceError, PriceStore, StorageError};
use futconv_core::domain::{ContractError, ContractKey, PriceFrequency, PriceSeries, RowTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Rows shown from the end of each series.
pub const TAIL_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum CheckError {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub key: ContractKey,
    pub vendor_file: PathBuf,
    pub stored: PriceSeries,
    pub vendor: PriceSeries,
}

impl fmt::Display for PriceComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Stored prices for {}, contract {} ({} rows):",
            self.key.instrument,
            self.key.date_str(),
            self.stored.len()
        )?;
        if self.stored.is_empty() {
            writeln!(f, "  (nothing stored)")?;
        } else {
            write!(f, "{}", RowTable(self.stored.tail(TAIL_ROWS)))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Vendor CSV prices for {}, contract {} ({} rows, {}):",
            self.key.instrument,
            self.key.date_str(),
            self.vendor.len(),
            self.vendor_file.display()
        )?;
        write!(f, "{}", RowTable(self.vendor.tail(TAIL_ROWS)))
    }
}

pub struct ConsistencyChecker<'a, S: PriceStore + ?Sized> {
    store: &'a S,
    profile: &'a VendorProfile,
}

impl<'a, S: PriceStore + ?Sized> ConsistencyChecker<'a, S> {
    pub fn new(store: &'a S, profile: &'a VendorProfile) -> Self {
        Self { store, profile }
    }

    pub fn check(
        &self,
        dir: &Path,
        instrument: &str,
        contract_date: &str,
    ) -> Result<PriceComparison, CheckError> {
        let key = ContractKey::from_date_str(instrument, contract_date)?;
        info!(contract = %key, "checking stored prices against vendor file");

        let stored = self.store.get_merged_prices(&key)?;

        let vendor_file = daily_file_for(dir, &key).ok_or_else(|| CheckError::NoContractFile {
            contract: key.to_string(),
            dir: dir.to_path_buf(),
        })?;
        let config = self.profile.csv_config_for(instrument)?;
        let vendor = read_price_csv(&vendor_file, &config, PriceFrequency::Daily).map_err(|source| CheckError::Csv {
            file: vendor_file.clone(),
            source,
        })?;

        Ok(PriceComparison {
            key,
            vendor_file,
            stored,
            vendor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futconv_core::data::ParquetPriceStore;
    use std::fs;

    #[test]
    fn missing_vendor_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ParquetPriceStore::new(tmp.path().join("store"));
        let profile = VendorProfile::norgate();
        let err = ConsistencyChecker::new(&store, &profile)
            .check(tmp.path(), "GOLD", "20240800")
            .unwrap_err();
        assert!(matches!(err, CheckError::NoContractFile { .. }));
    }

    #[test]
    fn bad_contract_date_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ParquetPriceStore::new(tmp.path().join("store"));
        let profile = VendorProfile::norgate();
        let err = ConsistencyChecker::new(&store, &profile)
            .check(tmp.path(), "GOLD", "2024-08")
            .unwrap_err();
        assert!(matches!(err, CheckError::Contract(_)));
    }

    #[test]
    fn empty_store_still_shows_vendor_side() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("Day_GOLD_20240800.csv"),
            "Date,Open,High,Low,Close,Volume\n2024-06-27,2330,2340,2320,2335,900\n",
        )
        .unwrap();
        let store = ParquetPriceStore::new(tmp.path().join("store"));
        let profile = VendorProfile::norgate();
        let cmp = ConsistencyChecker::new(&store, &profile)
            .check(tmp.path(), "GOLD", "202408")
            .unwrap();
        assert!(cmp.stored.is_empty());
        assert_eq!(cmp.vendor.len(), 1);
        let text = cmp.to_string();
        assert!(text.contains("(nothing stored)"));
        assert!(text.contains("2024-06-27 23:00:00"));
    }
}
