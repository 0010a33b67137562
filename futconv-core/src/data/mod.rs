//! Price data: vendor CSV decoding and the per-contract price store.

pub mod csv_prices;
pub mod parquet_store;
pub mod store;

pub use csv_prices::{parse_price_csv, read_price_csv, CsvPriceError};
pub use parquet_store::{series_hash, ParquetPriceStore, StoreMeta};
pub use store::{PriceStore, StorageError, WriteOutcome};
