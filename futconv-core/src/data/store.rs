//! Price store trait and structured error types.
//!
//! The PriceStore trait abstracts over the storage engine that holds
//! per-contract price series, so the loader and checker can be tested
//! against a temporary store and swapped onto another backend.

use crate::domain::{ContractKey, PriceFrequency, PriceSeries};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("corrupt store file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("refusing to store an empty series for {contract}")]
    EmptySeries { contract: String },
}

/// Result of one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// Rows whose timestamps were not stored before.
    pub rows_added: usize,
    /// Incoming rows whose timestamps were already stored (kept as stored).
    pub rows_ignored: usize,
    /// Rows stored for this contract and frequency after the write.
    pub total_rows: usize,
}

/// Storage engine for per-contract price series.
pub trait PriceStore: Send + Sync {
    /// Merge `series` into the stored prices of one contract at one frequency.
    ///
    /// Already-stored timestamps keep their stored values, so writing the
    /// same data twice leaves the store unchanged.
    fn write_prices(
        &self,
        key: &ContractKey,
        frequency: PriceFrequency,
        series: &PriceSeries,
    ) -> Result<WriteOutcome, StorageError>;

    /// Stored prices at one frequency; empty when nothing is stored.
    fn get_prices(
        &self,
        key: &ContractKey,
        frequency: PriceFrequency,
    ) -> Result<PriceSeries, StorageError>;

    /// Contracts with any stored prices for `instrument`, sorted.
    fn contracts_for_instrument(&self, instrument: &str) -> Result<Vec<ContractKey>, StorageError>;

    /// All frequencies of one contract on one timeline. Where timestamps
    /// collide, hourly beats daily beats mixed.
    fn get_merged_prices(&self, key: &ContractKey) -> Result<PriceSeries, StorageError> {
        let mixed = self.get_prices(key, PriceFrequency::Mixed)?;
        let daily = self.get_prices(key, PriceFrequency::Daily)?;
        let hourly = self.get_prices(key, PriceFrequency::Hourly)?;
        Ok(mixed.merge_preferring(&daily).merge_preferring(&hourly))
    }
}
