//! Roll calendar configuration store (`rollconfig.csv`).

use super::ConfigStoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Roll parameters for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollParameters {
    #[serde(rename = "Instrument")]
    pub instrument: String,
    #[serde(rename = "HoldRollCycle", default)]
    pub hold_roll_cycle: String,
    #[serde(rename = "RollOffsetDays", default)]
    pub roll_offset_days: Option<i64>,
    #[serde(rename = "CarryOffset", default)]
    pub carry_offset: Option<i64>,
    #[serde(rename = "PricedRollCycle", default)]
    pub priced_roll_cycle: String,
    #[serde(rename = "ExpiryOffset", default)]
    pub expiry_offset: Option<i64>,
}

/// Predicate access to roll calendars.
pub trait RollCalendarSource: Send + Sync {
    fn has_roll_config(&self, code: &str) -> Result<bool, ConfigStoreError>;
}

/// Roll parameters loaded once from a `rollconfig.csv` file.
#[derive(Debug, Clone, Default)]
pub struct CsvRollConfig {
    rolls: HashMap<String, RollParameters>,
}

impl CsvRollConfig {
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

        let mut rolls = HashMap::new();
        for row in rdr.deserialize::<RollParameters>() {
            let params = row?;
            if params.instrument.is_empty() {
                continue;
            }
            rolls.insert(params.instrument.clone(), params);
        }
        Ok(Self { rolls })
    }

    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }
}

impl RollCalendarSource for CsvRollConfig {
    fn has_roll_config(&self, code: &str) -> Result<bool, ConfigStoreError> {
        Ok(self.rolls.contains_key(code))
    }
}
