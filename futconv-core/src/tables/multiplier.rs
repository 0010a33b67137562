//! Per-instrument price unit corrections.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MultiplierError {
    #[error("multiplier for '{instrument}' must be positive and finite, got {value}")]
    NotPositive { instrument: String, value: f64 },
}

/// Instrument → multiplier applied to OPEN/HIGH/LOW/FINAL on import.
///
/// Instruments that are absent load at their quoted scale (1.0).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiplierTable {
    multipliers: HashMap<String, f64>,
}

impl MultiplierTable {
    pub fn new<I, K>(entries: I) -> Result<Self, MultiplierError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut multipliers = HashMap::new();
        for (instrument, value) in entries {
            let instrument = instrument.into();
            if !(value.is_finite() && value > 0.0) {
                return Err(MultiplierError::NotPositive { instrument, value });
            }
            multipliers.insert(instrument, value);
        }
        Ok(Self { multipliers })
    }

    /// Multiplier for `instrument`, 1.0 when none is configured.
    pub fn resolve(&self, instrument: &str) -> f64 {
        self.multipliers.get(instrument).copied().unwrap_or(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    /// Entries in instrument order, for display.
    pub fn sorted_entries(&self) -> BTreeMap<&str, f64> {
        self.multipliers
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect()
    }

    /// Norgate quotes these markets in cents.
    pub fn norgate() -> Self {
        let cents = [
            "COFFEE", "COPPER", "COTTON2", "JPY", "OJ", "RICE", "SUGAR11",
        ];
        Self {
            multipliers: cents.iter().map(|c| (c.to_string(), 0.01)).collect(),
        }
    }
}

impl Serialize for MultiplierTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sorted_entries().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MultiplierTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = HashMap::<String, f64>::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_instrument_is_identity() {
        let t = MultiplierTable::norgate();
        assert_eq!(t.resolve("SP500_micro"), 1.0);
        assert_eq!(t.resolve("COFFEE"), 0.01);
        assert_eq!(MultiplierTable::default().resolve("COFFEE"), 1.0);
    }

    #[test]
    fn rejects_non_positive() {
        assert!(MultiplierTable::new([("X", 0.0)]).is_err());
        assert!(MultiplierTable::new([("X", -1.0)]).is_err());
        assert!(MultiplierTable::new([("X", f64::NAN)]).is_err());
        assert!(MultiplierTable::new([("X", 100.0)]).is_ok());
    }

    #[test]
    fn toml_validation_runs_on_deserialize() {
        let ok: MultiplierTable = toml::from_str("COFFEE = 0.01\n").unwrap();
        assert_eq!(ok.resolve("COFFEE"), 0.01);
        let bad: Result<MultiplierTable, _> = toml::from_str("COFFEE = -0.01\n");
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_in_instrument_order() {
        let t = MultiplierTable::norgate();
        let text = toml::to_string(&t).unwrap();
        let keys: Vec<&str> = text.lines().filter_map(|l| l.split(" = ").next()).collect();
        assert_eq!(
            keys,
            vec!["COFFEE", "COPPER", "COTTON2", "JPY", "OJ", "RICE", "SUGAR11"]
        );
        let back: MultiplierTable = toml::from_str(&text).unwrap();
        assert_eq!(back, t);
    }
}
