//! Vendor code → canonical instrument code table.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Read-only mapping from a vendor's market codes to canonical instrument codes.
///
/// Many vendor codes may alias the same instrument (mini and micro contracts
/// priced off one parent). Lookups are exact and case-sensitive: `FDAX9` is
/// not `FDAX`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CodeMapping {
    codes: HashMap<String, String>,
}

impl CodeMapping {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            codes: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Canonical instrument for a vendor code, `None` when unmapped.
    pub fn translate(&self, vendor_code: &str) -> Option<&str> {
        self.codes.get(vendor_code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in vendor-code order, for display.
    pub fn sorted_entries(&self) -> BTreeMap<&str, &str> {
        self.codes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Norgate Data futures market codes.
    ///
    /// `SO3` is not listed: Norgate's entry for it names a description
    /// rather than an instrument code, so SO3 files report as unmapped.
    pub fn norgate() -> Self {
        Self::new([
            ("6A", "AUD"),
            ("6B", "GBP"),
            ("6C", "CAD"),
            ("6E", "EUR"),
            ("6J", "JPY"),
            ("6M", "MXP"),
            ("6N", "NZD"),
            ("6S", "CHF"),
            ("AE", "AEX"),
            ("BAX", "CADSTIR"),
            ("BRN", "BRENT"),
            ("BTC", "BITCOIN"),
            ("CC", "COCOA"),
            ("CGB", "CAD10"),
            ("CL", "CRUDE_W"),
            ("CT", "COTTON2"),
            ("DC", "MILK"),
            ("DV", "V2X"),
            ("DX", "DX"),
            ("EH", "ETHANOL"),
            ("EMD", "SP400"),
            ("ES", "SP500_micro"),
            ("ET", "SP500_micro"),
            ("EUA", "EUA"),
            ("FBTP", "BTP"),
            ("FCE", "CAC"),
            ("FDAX", "DAX"),
            ("FESX", "EUROSTX"),
            ("FGBL", "BUND"),
            ("FGBM", "BOBL"),
            ("FGBS", "SHATZ"),
            ("FGBX", "BUXL"),
            ("FOAT", "OAT"),
            ("FSMI", "SMI"),
            ("GAS", "GASOIL"),
            ("GC", "GOLD"),
            ("GD", "GICS"),
            ("GE", "EDOLLAR"),
            ("GF", "FEEDCOW"),
            ("GWM", "GAS_UK"),
            ("HE", "LEANHOG"),
            ("HG", "COPPER"),
            ("HO", "HEATOIL"),
            ("HSI", "HANG"),
            ("KC", "COFFEE"),
            ("KE", "REDWHEAT"),
            ("KOS", "KOSPI"),
            ("LBR", "LUMBER-new"),
            ("LBS", "LUMBER"),
            ("LCC", "COCOA_LDN"),
            ("LE", "LIVECOW"),
            ("LES", "EURCHF"),
            ("LEU", "EURIBOR"),
            ("LFT", "FTSE100"),
            ("LLG", "GILT"),
            ("LRC", "ROBUSTA"),
            ("LSU", "SUGAR_WHITE"),
            ("M2K", "RUSSELL"),
            ("MBT", "BITCOIN"),
            ("MHI", "HANG_mini"),
            ("MNQ", "NASDAQ_micro"),
            ("MYM", "DOW"),
            ("NG", "GAS_US"),
            ("NIY", "NIKKEI-JPY"),
            ("NKD", "NIKKEI"),
            ("NM", "NASDAQ_micro"),
            ("NQ", "NASDAQ"),
            ("OJ", "OJ"),
            ("PA", "PALLAD"),
            ("PL", "PLAT"),
            ("QG", "GAS_US_mini"),
            ("QM", "CRUDE_W_mini"),
            ("RB", "GASOILINE"),
            ("RS", "CANOLA"),
            ("RTY", "RUSSELL"),
            ("SB", "SUGAR11"),
            ("SCN", "FTSECHINAA"),
            ("SI", "SILVER"),
            ("SJB", "JGB-mini"),
            ("SR3", "SOFR"),
            ("SSG", "MSCISING"),
            ("TN", "US10U"),
            ("UB", "US30"),
            ("VX", "VIX"),
            ("YAP", "ASX"),
            ("YG", "GOLD_micro"),
            ("YI", "SILVER-mini"),
            ("YM", "DOW"),
            ("ZB", "US20"),
            ("ZC", "CORN"),
            ("ZF", "US5"),
            ("ZL", "SOYOIL"),
            ("ZM", "SOYMEAL"),
            ("ZN", "US10"),
            ("ZO", "OATIES"),
            ("ZR", "RICE"),
            ("ZS", "SOYBEAN"),
            ("ZT", "US2"),
            ("ZW", "WHEAT"),
        ])
    }
}

impl Serialize for CodeMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sorted_entries().serialize(serializer)
    }
}
