//! Instrument metadata store.
//!
//! The CSV layout follows the research platform's `instrumentconfig.csv`:
//! one row per canonical instrument, cost columns may be left blank while an
//! instrument is being set up.

use super::ConfigStoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// One row of instrument configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    #[serde(rename = "Instrument")]
    pub instrument: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Pointsize", default)]
    pub point_size: Option<f64>,
    #[serde(rename = "Currency", default)]
    pub currency: String,
    #[serde(rename = "AssetClass", default)]
    pub asset_class: String,
    #[serde(rename = "Slippage", default)]
    pub slippage: Option<f64>,
    #[serde(rename = "PerBlock", default)]
    pub per_block: Option<f64>,
    #[serde(rename = "Percentage", default)]
    pub percentage: Option<f64>,
    #[serde(rename = "PerTrade", default)]
    pub per_trade: Option<f64>,
    #[serde(rename = "Region", default)]
    pub region: String,
}

impl InstrumentMetadata {
    /// Fields that are missing or unusable. Empty means well-formed.
    pub fn problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();

        match self.point_size {
            Some(p) if p.is_finite() && p > 0.0 => {}
            _ => problems.push("point size"),
        }
        if self.currency.trim().is_empty() {
            problems.push("currency");
        }

        let costs = [
            ("slippage", self.slippage),
            ("per-block cost", self.per_block),
            ("percentage cost", self.percentage),
            ("per-trade cost", self.per_trade),
        ];
        for (name, value) in costs {
            match value {
                Some(v) if v.is_finite() && v >= 0.0 => {}
                _ => problems.push(name),
            }
        }

        problems
    }

    pub fn is_well_formed(&self) -> bool {
        self.problems().is_empty()
    }
}

/// Read access to instrument metadata. Absence is `Ok(None)`, never an error.
pub trait InstrumentSource: Send + Sync {
    fn get_instrument(&self, code: &str) -> Result<Option<InstrumentMetadata>, ConfigStoreError>;
}

/// Instrument metadata loaded once from an `instrumentconfig.csv` file.
#[derive(Debug, Clone, Default)]
pub struct CsvInstrumentConfig {
    instruments: HashMap<String, InstrumentMetadata>,
}

impl CsvInstrumentConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigStoreError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigStoreError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut instruments = HashMap::new();
        for row in rdr.deserialize::<InstrumentMetadata>() {
            let meta = row?;
            if meta.instrument.is_empty() {
                continue;
            }
            instruments.insert(meta.instrument.clone(), meta);
        }
        Ok(Self { instruments })
    }

    pub fn from_rows(rows: impl IntoIterator<Item = InstrumentMetadata>) -> Self {
        Self {
            instruments: rows
                .into_iter()
                .map(|m| (m.instrument.clone(), m))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl InstrumentSource for CsvInstrumentConfig {
    fn get_instrument(&self, code: &str) -> Result<Option<InstrumentMetadata>, ConfigStoreError> {
        Ok(self.instruments.get(code).cloned())
    }
}
