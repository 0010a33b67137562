//! Vendor file identifiers.
//!
//! Vendor price files are named `<vendor_code>-<YYYY><month-letter>.csv`,
//! e.g. `ES-2011U.csv` for the September 2011 E-mini contract. The month
//! letter follows the standard futures delivery-month alphabet.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Futures delivery-month letter (F = January ... Z = December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonthCode {
    F,
    G,
    H,
    J,
    K,
    M,
    N,
    Q,
    U,
    V,
    X,
    Z,
}

impl MonthCode {
    pub const ALL: [MonthCode; 12] = [
        MonthCode::F,
        MonthCode::G,
        MonthCode::H,
        MonthCode::J,
        MonthCode::K,
        MonthCode::M,
        MonthCode::N,
        MonthCode::Q,
        MonthCode::U,
        MonthCode::V,
        MonthCode::X,
        MonthCode::Z,
    ];

    /// Parse a month letter. Case-sensitive: vendors always use upper case.
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.letter() == letter)
    }

    /// Month code for a calendar month (1-12).
    pub fn from_month(month: u32) -> Option<Self> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    pub fn letter(self) -> char {
        match self {
            MonthCode::F => 'F',
            MonthCode::G => 'G',
            MonthCode::H => 'H',
            MonthCode::J => 'J',
            MonthCode::K => 'K',
            MonthCode::M => 'M',
            MonthCode::N => 'N',
            MonthCode::Q => 'Q',
            MonthCode::U => 'U',
            MonthCode::V => 'V',
            MonthCode::X => 'X',
            MonthCode::Z => 'Z',
        }
    }

    /// Calendar month, 1-12.
    pub fn month(self) -> u32 {
        self as u32 + 1
    }
}

impl fmt::Display for MonthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Why a vendor file name could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("'{name}': missing '-' between vendor code and contract date")]
    MissingSeparator { name: String },

    #[error("'{name}': empty vendor code")]
    EmptyCode { name: String },

    #[error("'{name}': year '{year}' is not four digits")]
    BadYear { name: String, year: String },

    #[error("'{name}': missing month letter")]
    MissingMonth { name: String },

    #[error("'{name}': '{letter}' is not a futures month code")]
    BadMonth { name: String, letter: char },

    #[error("'{name}': unexpected trailing characters '{rest}'")]
    TrailingCharacters { name: String, rest: String },
}

/// A parsed vendor file name: which market and which delivery month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorFileIdentifier {
    pub vendor_code: String,
    pub year: i32,
    pub month: u32,
}

impl VendorFileIdentifier {
    /// Parse a vendor file name. The `.csv` extension is optional.
    pub fn parse(file_name: &str) -> Result<Self, IdentifierError> {
        let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
        let err_name = || stem.to_string();

        let (code, date) = stem
            .split_once('-')
            .ok_or_else(|| IdentifierError::MissingSeparator { name: err_name() })?;

        if code.is_empty() {
            return Err(IdentifierError::EmptyCode { name: err_name() });
        }

        let year_str = date.get(..4).unwrap_or(date);
        if year_str.len() != 4 || !year_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentifierError::BadYear {
                name: err_name(),
                year: year_str.to_string(),
            });
        }
        // Four ASCII digits always fit in an i32.
        let year: i32 = year_str.parse().map_err(|_| IdentifierError::BadYear {
            name: err_name(),
            year: year_str.to_string(),
        })?;

        let mut rest = date[4..].chars();
        let letter = rest
            .next()
            .ok_or_else(|| IdentifierError::MissingMonth { name: err_name() })?;
        let month_code = MonthCode::from_letter(letter).ok_or(IdentifierError::BadMonth {
            name: err_name(),
            letter,
        })?;

        let trailing: String = rest.collect();
        if !trailing.is_empty() {
            return Err(IdentifierError::TrailingCharacters {
                name: err_name(),
                rest: trailing,
            });
        }

        Ok(Self {
            vendor_code: code.to_string(),
            year,
            month: month_code.month(),
        })
    }

    /// Vendor code of a file name without validating the date part.
    ///
    /// Used to apply a code filter before full parsing.
    pub fn code_of(file_name: &str) -> &str {
        let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
        stem.split_once('-').map_or(stem, |(code, _)| code)
    }

    pub fn month_code(&self) -> Option<MonthCode> {
        MonthCode::from_month(self.month)
    }

    /// The vendor file name this identifier was parsed from, with extension.
    pub fn file_name(&self) -> String {
        let letter = self.month_code().map_or('?', MonthCode::letter);
        format!("{}-{:04}{}.csv", self.vendor_code, self.year, letter)
    }
}
