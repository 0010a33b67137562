//! futconv core: domain types, lookup tables, configuration and price storage.
//!
//! This crate holds everything the conversion pipeline is built from:
//! - Vendor file identifiers (`ES-2011U.csv`) and canonical contract keys
//! - The vendor code mapping and price multiplier tables
//! - Vendor profiles, CSV layouts, and the instrument/roll configuration stores
//! - Vendor CSV decoding and the Parquet price store

pub mod config;
pub mod data;
pub mod domain;
pub mod tables;
