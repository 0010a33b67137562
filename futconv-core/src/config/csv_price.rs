//! How to read one vendor's per-contract price CSVs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CsvConfigError {
    #[error("{field} column name must not be empty")]
    EmptyColumn { field: &'static str },

    #[error("date format must not be empty")]
    EmptyDateFormat,

    #[error("multiplier must be positive and finite, got {0}")]
    BadMultiplier(f64),

    #[error("adjust_hours must be within -48..=48, got {0}")]
    BadHourAdjustment(i64),
}

/// Daily timestamps may be moved by at most two days.
const MAX_HOUR_ADJUSTMENT: i64 = 48;

/// Default format for `Hour_` price files.
const DEFAULT_INTRADAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Vendor column names for the five canonical fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub open: String,
    pub high: String,
    pub low: String,
    #[serde(rename = "final")]
    pub final_price: String,
    pub volume: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            open: "Open".into(),
            high: "High".into(),
            low: "Low".into(),
            final_price: "Close".into(),
            volume: "Volume".into(),
        }
    }
}

/// Immutable CSV parsing configuration.
///
/// Construct through [`CsvPriceConfig::builder`] or one of the presets;
/// the builder validates on [`CsvPriceConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CsvPriceConfigBuilder", into = "CsvPriceConfigBuilder")]
pub struct CsvPriceConfig {
    date_column: String,
    skip_rows: usize,
    skip_footer: usize,
    date_format: String,
    intraday_date_format: String,
    columns: ColumnMapping,
    adjust_hours: i64,
    multiplier: f64,
}

impl CsvPriceConfig {
    pub fn builder() -> CsvPriceConfigBuilder {
        CsvPriceConfigBuilder::default()
    }

    /// ISO dates (`2024-06-28`), Norgate column names, daily closes stamped 23:00.
    pub fn iso_daily() -> Self {
        Self {
            date_column: "Date".into(),
            skip_rows: 0,
            skip_footer: 0,
            date_format: "%Y-%m-%d".into(),
            intraday_date_format: DEFAULT_INTRADAY_DATE_FORMAT.into(),
            columns: ColumnMapping::default(),
            adjust_hours: 23,
            multiplier: 1.0,
        }
    }

    /// Compact dates (`20240628`), otherwise as [`CsvPriceConfig::iso_daily`].
    pub fn compact_daily() -> Self {
        Self {
            date_format: "%Y%m%d".into(),
            ..Self::iso_daily()
        }
    }

    /// Copy of this config with the given price multiplier.
    pub fn with_multiplier(&self, multiplier: f64) -> Result<Self, CsvConfigError> {
        check_multiplier(multiplier)?;
        Ok(Self {
            multiplier,
            ..self.clone()
        })
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Lines above the header row to discard.
    pub fn skip_rows(&self) -> usize {
        self.skip_rows
    }

    /// Trailing data rows to discard.
    pub fn skip_footer(&self) -> usize {
        self.skip_footer
    }

    /// Date format of daily rows.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Date-time format of hourly rows. Never shifted by `adjust_hours`.
    pub fn intraday_date_format(&self) -> &str {
        &self.intraday_date_format
    }

    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    /// Hours added to every daily timestamp.
    pub fn adjust_hours(&self) -> i64 {
        self.adjust_hours
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Default for CsvPriceConfig {
    fn default() -> Self {
        Self::iso_daily()
    }
}

fn check_multiplier(multiplier: f64) -> Result<(), CsvConfigError> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(())
    } else {
        Err(CsvConfigError::BadMultiplier(multiplier))
    }
}

/// Builder for [`CsvPriceConfig`]. Also the serialized form of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvPriceConfigBuilder {
    date_column: String,
    skip_rows: usize,
    skip_footer: usize,
    date_format: String,
    intraday_date_format: String,
    columns: ColumnMapping,
    adjust_hours: i64,
    multiplier: f64,
}

impl Default for CsvPriceConfigBuilder {
    fn default() -> Self {
        CsvPriceConfig::iso_daily().into()
    }
}

impl CsvPriceConfigBuilder {
    pub fn date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }

    pub fn skip_rows(mut self, n: usize) -> Self {
        self.skip_rows = n;
        self
    }

    pub fn skip_footer(mut self, n: usize) -> Self {
        self.skip_footer = n;
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn intraday_date_format(mut self, format: impl Into<String>) -> Self {
        self.intraday_date_format = format.into();
        self
    }

    pub fn columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    pub fn adjust_hours(mut self, hours: i64) -> Self {
        self.adjust_hours = hours;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn build(self) -> Result<CsvPriceConfig, CsvConfigError> {
        let named = [
            ("date", &self.date_column),
            ("OPEN", &self.columns.open),
            ("HIGH", &self.columns.high),
            ("LOW", &self.columns.low),
            ("FINAL", &self.columns.final_price),
            ("VOLUME", &self.columns.volume),
        ];
        if let Some(&(field, _)) = named.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(CsvConfigError::EmptyColumn { field });
        }
        if self.date_format.is_empty() || self.intraday_date_format.is_empty() {
            return Err(CsvConfigError::EmptyDateFormat);
        }
        if !(-MAX_HOUR_ADJUSTMENT..=MAX_HOUR_ADJUSTMENT).contains(&self.adjust_hours) {
            return Err(CsvConfigError::BadHourAdjustment(self.adjust_hours));
        }
        check_multiplier(self.multiplier)?;

        Ok(CsvPriceConfig {
            date_column: self.date_column,
            skip_rows: self.skip_rows,
            skip_footer: self.skip_footer,
            date_format: self.date_format,
            intraday_date_format: self.intraday_date_format,
            columns: self.columns,
            adjust_hours: self.adjust_hours,
            multiplier: self.multiplier,
        })
    }
}

impl From<CsvPriceConfig> for CsvPriceConfigBuilder {
    fn from(c: CsvPriceConfig) -> Self {
        Self {
            date_column: c.date_column,
            skip_rows: c.skip_rows,
            skip_footer: c.skip_footer,
            date_format: c.date_format,
            intraday_date_format: c.intraday_date_format,
            columns: c.columns,
            adjust_hours: c.adjust_hours,
            multiplier: c.multiplier,
        }
    }
}

impl TryFrom<CsvPriceConfigBuilder> for CsvPriceConfig {
    type Error = CsvConfigError;

    fn try_from(b: CsvPriceConfigBuilder) -> Result<Self, Self::Error> {
        b.build()
    }
}
