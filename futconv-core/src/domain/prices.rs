//! Per-contract OHLCV price rows.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One OHLCV row of a contract price series.
///
/// `final_price` is the settlement/close. Missing vendor cells are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub final_price: f64,
    pub volume: f64,
}

impl PriceRow {
    /// Scale the four price fields. Volume is a count and is left alone.
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            timestamp: self.timestamp,
            open: self.open * multiplier,
            high: self.high * multiplier,
            low: self.low * multiplier,
            final_price: self.final_price * multiplier,
            volume: self.volume,
        }
    }
}

/// Time-ordered price rows for one contract, unique per timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    /// Build a series, sorting by timestamp. Later duplicates of a timestamp win.
    pub fn from_rows(rows: Vec<PriceRow>) -> Self {
        let by_ts: BTreeMap<NaiveDateTime, PriceRow> =
            rows.into_iter().map(|r| (r.timestamp, r)).collect();
        Self {
            rows: by_ts.into_values().collect(),
        }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&PriceRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&PriceRow> {
        self.rows.last()
    }

    /// The last `n` rows (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[PriceRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    /// Multiply OPEN/HIGH/LOW/FINAL by `multiplier`.
    pub fn scale_prices(&self, multiplier: f64) -> Self {
        Self {
            rows: self.rows.iter().map(|r| r.scaled(multiplier)).collect(),
        }
    }

    /// Union on timestamp; rows from `preferred` replace rows of `self` at
    /// the same timestamp.
    pub fn merge_preferring(&self, preferred: &PriceSeries) -> Self {
        let mut by_ts: BTreeMap<NaiveDateTime, PriceRow> =
            self.rows.iter().map(|r| (r.timestamp, r.clone())).collect();
        for row in &preferred.rows {
            by_ts.insert(row.timestamp, row.clone());
        }
        Self {
            rows: by_ts.into_values().collect(),
        }
    }

    /// Number of timestamps in `other` that this series does not have yet.
    pub fn count_new(&self, other: &PriceSeries) -> usize {
        other
            .rows
            .iter()
            .filter(|r| {
                self.rows
                    .binary_search_by_key(&r.timestamp, |mine| mine.timestamp)
                    .is_err()
            })
            .count()
    }
}

/// Renders rows as a fixed-width table.
pub struct RowTable<'a>(pub &'a [PriceRow]);

impl fmt::Display for RowTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "timestamp", "OPEN", "HIGH", "LOW", "FINAL", "VOLUME"
        )?;
        for r in self.0 {
            writeln!(
                f,
                "{:<20} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12}",
                r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                r.open,
                r.high,
                r.low,
                r.final_price,
                r.volume
            )?;
        }
        Ok(())
    }
}
