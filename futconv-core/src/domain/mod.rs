//! Domain types for futconv

pub mod contract;
pub mod identifier;
pub mod prices;

pub use contract::{CanonicalPriceFile, ContractError, ContractKey, PriceFrequency};
pub use identifier::{IdentifierError, MonthCode, VendorFileIdentifier};
pub use prices::{PriceRow, PriceSeries, RowTable};
