//! Batch rename of a vendor download directory.
//!
//! For every `*.csv` file (sorted by name) the orchestrator parses the vendor
//! identifier, translates the vendor code, validates the canonical instrument
//! and, only when it is fully configured, relocates the file. Per-file
//! outcomes are classified into buckets; only a failure to list the
//! directory aborts the run.

use crate::relocator::{FileRelocator, Relocation};
use crate::validator::{ConfigStatus, ConfigValidator};
use futconv_core::domain::{ContractKey, VendorFileIdentifier};
use futconv_core::tables::CodeMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot list {dir}: {source}")]
    Listing {
        dir: PathBuf,
        source: std::io::Error,
    },
}

/// Per-run classification. Every set is deduplicated and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationBuckets {
    /// Canonical instruments with at least one file relocated (or planned).
    pub mapped: BTreeSet<String>,
    /// Vendor codes with no canonical instrument.
    pub unmapped: BTreeSet<String>,
    /// Canonical instruments with absent or incomplete metadata.
    pub misconfigured: BTreeSet<String>,
    /// Canonical instruments without roll parameters.
    pub no_roll_config: BTreeSet<String>,
    /// File names that are not `CODE-YYYYL.csv`.
    pub unparsed: BTreeSet<String>,
}

/// A file whose processing hit a store or filesystem error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub source_dir: PathBuf,
    pub code_filter: Option<String>,
    pub dry_run: bool,
    pub buckets: ClassificationBuckets,
    pub relocations: Vec<Relocation>,
    pub failed: Vec<FileFailure>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

fn fmt_set(set: &BTreeSet<String>) -> String {
    let items: Vec<&str> = set.iter().map(String::as_str).collect();
    format!("[{}]", items.join(", "))
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.buckets;
        if b.mapped.is_empty() {
            return writeln!(
                f,
                "No files named {}-*.csv found at '{}'. Were the files already renamed?",
                self.code_filter.as_deref().unwrap_or("*"),
                self.source_dir.display()
            );
        }

        writeln!(f, "Successfully mapped: {}", fmt_set(&b.mapped))?;
        writeln!(f, "Unmapped: {}", fmt_set(&b.unmapped))?;
        writeln!(f, "Not properly configured: {}", fmt_set(&b.misconfigured))?;
        writeln!(f, "No roll config: {}", fmt_set(&b.no_roll_config))?;
        writeln!(f, "Unparsed file names: {}", fmt_set(&b.unparsed))?;
        if !self.failed.is_empty() {
            writeln!(f, "Failed ({}):", self.failed.len())?;
            for failure in &self.failed {
                writeln!(f, "  {}: {}", failure.file, failure.error)?;
            }
        }
        Ok(())
    }
}

/// Drives parse → translate → validate → relocate over a directory.
pub struct BatchOrchestrator<'a> {
    mapping: &'a CodeMapping,
    validator: ConfigValidator<'a>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(mapping: &'a CodeMapping, validator: ConfigValidator<'a>) -> Self {
        Self { mapping, validator }
    }

    pub fn run(
        &self,
        source_dir: &Path,
        code_filter: Option<&str>,
        dry_run: bool,
    ) -> Result<BatchReport, BatchError> {
        // `.` and `..` have no name to derive the `_conv` sibling from.
        let resolved = fs::canonicalize(source_dir).map_err(|source| BatchError::Listing {
            dir: source_dir.to_path_buf(),
            source,
        })?;
        let source_dir = resolved.as_path();
        let files = list_csv_files(source_dir)?;
        let relocator = FileRelocator::new(source_dir);

        let mut report = BatchReport {
            source_dir: source_dir.to_path_buf(),
            code_filter: code_filter.map(str::to_string),
            dry_run,
            buckets: ClassificationBuckets::default(),
            relocations: Vec::new(),
            failed: Vec::new(),
        };

        info!(
            dir = %source_dir.display(),
            files = files.len(),
            dry_run,
            "scanning vendor directory"
        );

        for file in &files {
            if let Some(filter) = code_filter {
                if VendorFileIdentifier::code_of(file) != filter {
                    continue;
                }
            }
            self.process_file(file, &relocator, dry_run, &mut report);
        }

        info!(
            mapped = report.buckets.mapped.len(),
            unmapped = report.buckets.unmapped.len(),
            misconfigured = report.buckets.misconfigured.len(),
            no_roll_config = report.buckets.no_roll_config.len(),
            unparsed = report.buckets.unparsed.len(),
            failed = report.failed.len(),
            "batch complete"
        );

        Ok(report)
    }

    fn process_file(
        &self,
        file: &str,
        relocator: &FileRelocator,
        dry_run: bool,
        report: &mut BatchReport,
    ) {
        let id = match VendorFileIdentifier::parse(file) {
            Ok(id) => id,
            Err(e) => {
                warn!(file, error = %e, "unparseable file name");
                report.buckets.unparsed.insert(file.to_string());
                return;
            }
        };

        let Some(instrument) = self.mapping.translate(&id.vendor_code) else {
            debug!(file, vendor_code = %id.vendor_code, "unmapped vendor code");
            report.buckets.unmapped.insert(id.vendor_code);
            return;
        };

        match self.validator.validate(instrument) {
            Ok(ConfigStatus::Configured) => {}
            Ok(ConfigStatus::Misconfigured) => {
                warn!(file, instrument, "instrument metadata missing or incomplete");
                report.buckets.misconfigured.insert(instrument.to_string());
                return;
            }
            Ok(ConfigStatus::NoRollConfig) => {
                warn!(file, instrument, "no roll config");
                report.buckets.no_roll_config.insert(instrument.to_string());
                return;
            }
            Err(e) => {
                warn!(file, instrument, error = %e, "configuration lookup failed");
                report.failed.push(FileFailure {
                    file: file.to_string(),
                    error: e.to_string(),
                });
                return;
            }
        }

        let key = match ContractKey::new(instrument, id.year, id.month) {
            Ok(key) => key,
            Err(e) => {
                report.failed.push(FileFailure {
                    file: file.to_string(),
                    error: e.to_string(),
                });
                return;
            }
        };

        match relocator.relocate(file, &key, dry_run) {
            Ok(relocation) => {
                info!(file, instrument, contract = %key.date_str(), "{relocation}");
                report.buckets.mapped.insert(instrument.to_string());
                report.relocations.push(relocation);
            }
            Err(e) => {
                warn!(file, instrument, error = %e, "relocation failed");
                report.failed.push(FileFailure {
                    file: file.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Names of `*.csv` files directly inside `dir`, sorted.
fn list_csv_files(dir: &Path) -> Result<Vec<String>, BatchError> {
    let listing_err = |source| BatchError::Listing {
        dir: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(listing_err)? {
        let path = entry.map_err(listing_err)?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
