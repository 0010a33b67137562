//! Canonical contract keys and canonical price file names.
//!
//! A contract is addressed by instrument code plus delivery year and month.
//! Its date string is `YYYYMM00`; the trailing `00` marks a month-level
//! expiry rather than a specific day.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("contract date '{0}' must be YYYYMM or YYYYMM00")]
    BadDate(String),

    #[error("contract month {month} out of range in '{date}'")]
    BadMonth { date: String, month: u32 },

    #[error("empty instrument code")]
    EmptyInstrument,

    #[error("'{0}' is not a canonical price file name")]
    BadFileName(String),
}

/// One futures contract of one canonical instrument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractKey {
    pub instrument: String,
    pub year: i32,
    pub month: u32,
}

impl ContractKey {
    pub fn new(instrument: impl Into<String>, year: i32, month: u32) -> Result<Self, ContractError> {
        let instrument = instrument.into();
        if instrument.is_empty() {
            return Err(ContractError::EmptyInstrument);
        }
        if !(1..=12).contains(&month) {
            return Err(ContractError::BadMonth {
                date: format!("{year:04}{month:02}"),
                month,
            });
        }
        Ok(Self {
            instrument,
            year,
            month,
        })
    }

    /// Build a key from an instrument code and a `YYYYMM` / `YYYYMM00` string.
    pub fn from_date_str(instrument: impl Into<String>, date: &str) -> Result<Self, ContractError> {
        let digits_ok = date.bytes().all(|b| b.is_ascii_digit());
        let valid_shape = match date.len() {
            6 => digits_ok,
            8 => digits_ok && date.ends_with("00"),
            _ => false,
        };
        if !valid_shape {
            return Err(ContractError::BadDate(date.to_string()));
        }

        let year: i32 = date[..4]
            .parse()
            .map_err(|_| ContractError::BadDate(date.to_string()))?;
        let month: u32 = date[4..6]
            .parse()
            .map_err(|_| ContractError::BadDate(date.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(ContractError::BadMonth {
                date: date.to_string(),
                month,
            });
        }

        Self::new(instrument, year, month)
    }

    /// `YYYYMM00`
    pub fn date_str(&self) -> String {
        format!("{:04}{:02}00", self.year, self.month)
    }

    /// Destination name of a relocated vendor file: `<instrument>_<YYYYMM>00.csv`.
    pub fn file_name(&self) -> String {
        PriceFrequency::Mixed.file_name(self)
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.instrument, self.date_str())
    }
}

/// Sampling frequency of a price file.
///
/// Split-frequency files carry a `Day_` or `Hour_` prefix; unprefixed files
/// hold whatever the vendor delivered and are treated as mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFrequency {
    Daily,
    Hourly,
    Mixed,
}

impl PriceFrequency {
    pub const ALL: [PriceFrequency; 3] = [
        PriceFrequency::Daily,
        PriceFrequency::Hourly,
        PriceFrequency::Mixed,
    ];

    pub fn file_prefix(self) -> &'static str {
        match self {
            PriceFrequency::Daily => "Day_",
            PriceFrequency::Hourly => "Hour_",
            PriceFrequency::Mixed => "",
        }
    }

    /// Short tag used in store file names.
    pub fn tag(self) -> &'static str {
        match self {
            PriceFrequency::Daily => "day",
            PriceFrequency::Hourly => "hour",
            PriceFrequency::Mixed => "mixed",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.tag() == tag)
    }

    pub fn file_name(self, key: &ContractKey) -> String {
        format!("{}{}_{}.csv", self.file_prefix(), key.instrument, key.date_str())
    }
}

impl fmt::Display for PriceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A parsed canonical price file name: `[Day_|Hour_]<instrument>_<YYYYMM00>.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPriceFile {
    pub frequency: PriceFrequency,
    pub key: ContractKey,
}

impl CanonicalPriceFile {
    /// Parse a canonical file name. Instrument codes may themselves contain
    /// underscores (`SP500_micro`), so the date is split off the right.
    pub fn parse(file_name: &str) -> Result<Self, ContractError> {
        let bad = || ContractError::BadFileName(file_name.to_string());
        let stem = file_name.strip_suffix(".csv").ok_or_else(bad)?;

        let (frequency, rest) = if let Some(rest) = stem.strip_prefix("Day_") {
            (PriceFrequency::Daily, rest)
        } else if let Some(rest) = stem.strip_prefix("Hour_") {
            (PriceFrequency::Hourly, rest)
        } else {
            (PriceFrequency::Mixed, stem)
        };

        let (instrument, date) = rest.rsplit_once('_').ok_or_else(bad)?;
        if instrument.is_empty() {
            return Err(bad());
        }
        let key = ContractKey::from_date_str(instrument, date).map_err(|_| bad())?;

        Ok(Self { frequency, key })
    }

    pub fn file_name(&self) -> String {
        self.frequency.file_name(&self.key)
    }
}
