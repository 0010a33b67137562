//! Decode vendor per-contract CSV files into [`PriceSeries`].
//!
//! Column names, date formats, header/footer trimming, the hour adjustment
//! and the price multiplier all come from [`CsvPriceConfig`]. Blank price or
//! volume cells decode to NaN; anything else that fails to parse is an error.
//!
//! The file's [`PriceFrequency`] picks the date handling:
//!
//! - `Daily`: `date_format`, shifted by `adjust_hours`
//! - `Hourly`: `intraday_date_format`, never shifted
//! - `Mixed`: each row is tried as daily first, then as intraday
//!
//! A file with no header line at all decodes to an empty series.

use crate::config::CsvPriceConfig;
use crate::domain::{PriceFrequency, PriceRow, PriceSeries};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvPriceError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: cannot parse date '{value}' with format '{format}'")]
    BadDate {
        row: usize,
        value: String,
        format: String,
    },

    #[error("row {row}: cannot parse {column} value '{value}'")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },
}

/// Read and decode a price CSV file.
pub fn read_price_csv(
    path: &Path,
    config: &CsvPriceConfig,
    frequency: PriceFrequency,
) -> Result<PriceSeries, CsvPriceError> {
    let text = std::fs::read_to_string(path).map_err(|source| CsvPriceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_price_csv(&text, config, frequency)
}

/// Decode price CSV text.
pub fn parse_price_csv(
    text: &str,
    config: &CsvPriceConfig,
    frequency: PriceFrequency,
) -> Result<PriceSeries, CsvPriceError> {
    let mut body = text;
    for _ in 0..config.skip_rows() {
        body = body.split_once('\n').map_or("", |(_, rest)| rest);
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Ok(PriceSeries::default());
    }
    let index_of = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CsvPriceError::MissingColumn(name.to_string()))
    };

    let cols = config.columns();
    let date_idx = index_of(config.date_column())?;
    let price_cols = [
        (index_of(&cols.open)?, cols.open.as_str()),
        (index_of(&cols.high)?, cols.high.as_str()),
        (index_of(&cols.low)?, cols.low.as_str()),
        (index_of(&cols.final_price)?, cols.final_price.as_str()),
        (index_of(&cols.volume)?, cols.volume.as_str()),
    ];

    let mut records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    let keep = records.len().saturating_sub(config.skip_footer());
    records.truncate(keep);

    let dates = DateDecoder::new(config, frequency);
    let multiplier = config.multiplier();
    let mut rows = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let raw_date = record.get(date_idx).unwrap_or("");
        let timestamp = dates.decode(raw_date).ok_or_else(|| CsvPriceError::BadDate {
            row,
            value: raw_date.to_string(),
            format: dates.reported_format().to_string(),
        })?;

        let mut values = [f64::NAN; 5];
        for (slot, (idx, name)) in values.iter_mut().zip(price_cols.iter()) {
            *slot = parse_number(record.get(*idx).unwrap_or(""), row, name)?;
        }
        let [open, high, low, final_price, volume] = values;

        let parsed = PriceRow {
            timestamp,
            open,
            high,
            low,
            final_price,
            volume,
        };
        rows.push(if multiplier == 1.0 {
            parsed
        } else {
            parsed.scaled(multiplier)
        });
    }

    Ok(PriceSeries::from_rows(rows))
}

struct DateDecoder<'a> {
    daily_format: &'a str,
    intraday_format: &'a str,
    adjust: Duration,
    frequency: PriceFrequency,
}

impl<'a> DateDecoder<'a> {
    fn new(config: &'a CsvPriceConfig, frequency: PriceFrequency) -> Self {
        Self {
            daily_format: config.date_format(),
            intraday_format: config.intraday_date_format(),
            // adjust_hours is within -48..=48, see CsvPriceConfigBuilder::build.
            adjust: Duration::hours(config.adjust_hours()),
            frequency,
        }
    }

    fn decode(&self, raw: &str) -> Option<NaiveDateTime> {
        let daily = || parse_timestamp(raw, self.daily_format).map(|t| t + self.adjust);
        let intraday = || parse_timestamp(raw, self.intraday_format);
        match self.frequency {
            PriceFrequency::Daily => daily(),
            PriceFrequency::Hourly => intraday(),
            PriceFrequency::Mixed => daily().or_else(intraday),
        }
    }

    fn reported_format(&self) -> &str {
        match self.frequency {
            PriceFrequency::Hourly => self.intraday_format,
            PriceFrequency::Daily | PriceFrequency::Mixed => self.daily_format,
        }
    }
}

/// Accepts either a full date-time format or a date-only format.
fn parse_timestamp(raw: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, format).ok().or_else(|| {
        NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

fn parse_number(raw: &str, row: usize, column: &str) -> Result<f64, CsvPriceError> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| CsvPriceError::BadNumber {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}
