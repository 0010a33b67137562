//! Parquet price store with Hive-style partitioning.
//!
//! Layout: `{root}/instrument={CODE}/{YYYYMM00}_{freq}.parquet`
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Merge on timestamp; stored rows are never overwritten
//! - Integrity validation on load (required columns, non-null timestamps)
//! - Metadata sidecar per file (BLAKE3 hash, date range, row count)

use super::store::{PriceStore, StorageError, WriteOutcome};
use crate::domain::{ContractKey, PriceFrequency, PriceRow, PriceSeries};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "final", "volume"];

/// Metadata sidecar for one stored contract/frequency file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub instrument: String,
    pub contract: String,
    pub frequency: PriceFrequency,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    pub row_count: usize,
    pub data_hash: String,
    pub written_at: NaiveDateTime,
}

/// The Parquet store.
pub struct ParquetPriceStore {
    root: PathBuf,
}

impl ParquetPriceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/instrument={CODE}/`
    fn instrument_dir(&self, instrument: &str) -> PathBuf {
        self.root.join(format!("instrument={instrument}"))
    }

    fn data_path(&self, key: &ContractKey, frequency: PriceFrequency) -> PathBuf {
        self.instrument_dir(&key.instrument)
            .join(format!("{}_{}.parquet", key.date_str(), frequency.tag()))
    }

    fn meta_path(&self, key: &ContractKey, frequency: PriceFrequency) -> PathBuf {
        self.instrument_dir(&key.instrument)
            .join(format!("{}_{}.meta.json", key.date_str(), frequency.tag()))
    }

    /// Sidecar metadata for one stored file, if present and readable.
    pub fn get_meta(&self, key: &ContractKey, frequency: PriceFrequency) -> Option<StoreMeta> {
        let content = fs::read_to_string(self.meta_path(key, frequency)).ok()?;
        serde_json::from_str(&content).ok()
    }
}

impl PriceStore for ParquetPriceStore {
    fn write_prices(
        &self,
        key: &ContractKey,
        frequency: PriceFrequency,
        series: &PriceSeries,
    ) -> Result<WriteOutcome, StorageError> {
        if series.is_empty() {
            return Err(StorageError::EmptySeries {
                contract: key.to_string(),
            });
        }

        let dir = self.instrument_dir(&key.instrument);
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;

        let existing = self.get_prices(key, frequency)?;
        let rows_added = existing.count_new(series);
        let rows_ignored = series.len() - rows_added;
        if rows_added == 0 {
            return Ok(WriteOutcome {
                rows_added,
                rows_ignored,
                total_rows: existing.len(),
            });
        }

        let merged = series.merge_preferring(&existing);
        let path = self.data_path(key, frequency);
        let tmp_path = path.with_extension("parquet.tmp");

        let mut df = series_to_dataframe(&merged)?;
        write_parquet(&mut df, &tmp_path)?;

        // Atomic rename
        fs::rename(&tmp_path, &path).map_err(|source| {
            // Clean up temp file on rename failure
            let _ = fs::remove_file(&tmp_path);
            StorageError::Io {
                path: path.clone(),
                source,
            }
        })?;

        write_meta(&self.meta_path(key, frequency), key, frequency, &merged)?;

        Ok(WriteOutcome {
            rows_added,
            rows_ignored,
            total_rows: merged.len(),
        })
    }

    fn get_prices(
        &self,
        key: &ContractKey,
        frequency: PriceFrequency,
    ) -> Result<PriceSeries, StorageError> {
        let path = self.data_path(key, frequency);
        if !path.exists() {
            return Ok(PriceSeries::default());
        }
        load_and_validate_parquet(&path)
    }

    fn contracts_for_instrument(&self, instrument: &str) -> Result<Vec<ContractKey>, StorageError> {
        let dir = self.instrument_dir(instrument);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut keys = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: dir.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().to_string();

            // Skip sidecars and temp files
            let Some(stem) = name.strip_suffix(".parquet") else {
                continue;
            };
            let Some((date, tag)) = stem.split_once('_') else {
                continue;
            };
            if PriceFrequency::from_tag(tag).is_none() {
                continue;
            }
            if let Ok(key) = ContractKey::from_date_str(instrument, date) {
                keys.insert(key);
            }
        }

        Ok(keys.into_iter().collect())
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn series_to_dataframe(series: &PriceSeries) -> Result<DataFrame, StorageError> {
    let rows = series.rows();
    let millis: Vec<i64> = rows
        .iter()
        .map(|r| r.timestamp.and_utc().timestamp_millis())
        .collect();
    let opens: Vec<f64> = rows.iter().map(|r| r.open).collect();
    let highs: Vec<f64> = rows.iter().map(|r| r.high).collect();
    let lows: Vec<f64> = rows.iter().map(|r| r.low).collect();
    let finals: Vec<f64> = rows.iter().map(|r| r.final_price).collect();
    let volumes: Vec<f64> = rows.iter().map(|r| r.volume).collect();

    DataFrame::new(vec![
        Column::new("timestamp".into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(|e| StorageError::Parquet(format!("timestamp cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("final".into(), finals),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| StorageError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| StorageError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<PriceSeries, StorageError> {
    let corrupt = |reason: String| StorageError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let file = fs::File::open(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| corrupt(format!("read: {e}")))?;

    for name in COLUMNS {
        if df.column(name).is_err() {
            return Err(corrupt(format!("missing column '{name}'")));
        }
    }

    let float_col = |name: &str| -> Result<Vec<f64>, StorageError> {
        let ca = df
            .column(name)
            .and_then(|c| c.f64().cloned())
            .map_err(|e| corrupt(format!("{name} column type: {e}")))?;
        Ok(ca.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    };

    let ts_ca = df
        .column("timestamp")
        .and_then(|c| c.datetime().cloned())
        .map_err(|e| corrupt(format!("timestamp column type: {e}")))?;
    let opens = float_col("open")?;
    let highs = float_col("high")?;
    let lows = float_col("low")?;
    let finals = float_col("final")?;
    let volumes = float_col("volume")?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let millis = ts_ca
            .get(i)
            .ok_or_else(|| corrupt(format!("null timestamp at row {i}")))?;
        let timestamp = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| corrupt(format!("timestamp out of range at row {i}")))?
            .naive_utc();
        rows.push(PriceRow {
            timestamp,
            open: opens[i],
            high: highs[i],
            low: lows[i],
            final_price: finals[i],
            volume: volumes[i],
        });
    }

    Ok(PriceSeries::from_rows(rows))
}

fn write_meta(
    path: &Path,
    key: &ContractKey,
    frequency: PriceFrequency,
    series: &PriceSeries,
) -> Result<(), StorageError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Ok(());
    };

    let meta = StoreMeta {
        instrument: key.instrument.clone(),
        contract: key.date_str(),
        frequency,
        first: first.timestamp,
        last: last.timestamp,
        row_count: series.len(),
        data_hash: series_hash(series),
        written_at: chrono::Local::now().naive_local(),
    };
    let json = serde_json::to_string_pretty(&meta)
        .map_err(|e| StorageError::Metadata(format!("meta serialization: {e}")))?;
    fs::write(path, json).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deterministic BLAKE3 hash over timestamps and all OHLCV values.
pub fn series_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in series.rows() {
        hasher.update(&r.timestamp.and_utc().timestamp_millis().to_le_bytes());
        hasher.update(&r.open.to_le_bytes());
        hasher.update(&r.high.to_le_bytes());
        hasher.update(&r.low.to_le_bytes());
        hasher.update(&r.final_price.to_le_bytes());
        hasher.update(&r.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
