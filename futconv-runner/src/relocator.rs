//! Moves vendor files to their canonical names.
//!
//! Destination directory is the sibling `<source>_conv`, which must already
//! exist. The relocator never creates directories and never overwrites.

use futconv_core::domain::ContractKey;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("destination directory {0} does not exist")]
    DestinationDirMissing(PathBuf),

    #[error("source file {0} does not exist")]
    SourceMissing(PathBuf),

    #[error("destination {0} already exists")]
    DestinationExists(PathBuf),

    #[error("move {from} -> {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// A computed or performed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relocation {
    /// Dry run: nothing touched.
    Planned { from: PathBuf, to: PathBuf },
    Moved { from: PathBuf, to: PathBuf },
}

impl Relocation {
    pub fn from(&self) -> &Path {
        match self {
            Relocation::Planned { from, .. } | Relocation::Moved { from, .. } => from,
        }
    }

    pub fn to(&self) -> &Path {
        match self {
            Relocation::Planned { to, .. } | Relocation::Moved { to, .. } => to,
        }
    }

    pub fn is_planned(&self) -> bool {
        matches!(self, Relocation::Planned { .. })
    }
}

impl fmt::Display for Relocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relocation::Planned { from, to } => write!(
                f,
                "NOT renaming {} to {}, as dry run",
                from.display(),
                to.display()
            ),
            Relocation::Moved { from, to } => {
                write!(f, "Renamed {} to {}", from.display(), to.display())
            }
        }
    }
}

/// `/data/Futures` → `/data/Futures_conv`. A trailing separator is ignored.
///
/// Expects a resolved path: `.` and `..` are canonicalized by the caller.
pub fn conv_dir_for(source_dir: &Path) -> PathBuf {
    let mut name: OsString = source_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("_conv");
    match source_dir.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

pub struct FileRelocator {
    source_dir: PathBuf,
    dest_dir: PathBuf,
}

impl FileRelocator {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let dest_dir = conv_dir_for(&source_dir);
        Self {
            source_dir,
            dest_dir,
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    pub fn destination_for(&self, key: &ContractKey) -> PathBuf {
        self.dest_dir.join(key.file_name())
    }

    /// Move `source_file_name` (a name inside the source directory) to the
    /// canonical name of `key`. In dry-run mode only the paths are computed.
    pub fn relocate(
        &self,
        source_file_name: &str,
        key: &ContractKey,
        dry_run: bool,
    ) -> Result<Relocation, RelocationError> {
        let from = self.source_dir.join(source_file_name);
        let to = self.destination_for(key);

        if dry_run {
            return Ok(Relocation::Planned { from, to });
        }

        if !self.dest_dir.is_dir() {
            return Err(RelocationError::DestinationDirMissing(self.dest_dir.clone()));
        }
        if !from.is_file() {
            return Err(RelocationError::SourceMissing(from));
        }
        if to.exists() {
            return Err(RelocationError::DestinationExists(to));
        }

        match fs::rename(&from, &to) {
            Ok(()) => Ok(Relocation::Moved { from, to }),
            Err(source) => Err(RelocationError::Io { from, to, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ContractKey {
        ContractKey::new("SP500_micro", 2011, 9).unwrap()
    }

    #[test]
    fn conv_dir_is_a_sibling() {
        assert_eq!(
            conv_dir_for(Path::new("/data/norgate/Futures")),
            PathBuf::from("/data/norgate/Futures_conv")
        );
        assert_eq!(
            conv_dir_for(Path::new("/data/norgate/Futures/")),
            PathBuf::from("/data/norgate/Futures_conv")
        );
        assert_eq!(conv_dir_for(Path::new("Futures")), PathBuf::from("Futures_conv"));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("Futures");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("ES-2011U.csv"), "x").unwrap();

        // Destination directory missing is fine in a dry run.
        let r = FileRelocator::new(&src);
        let planned = r.relocate("ES-2011U.csv", &key(), true).unwrap();
        assert!(planned.is_planned());
        assert_eq!(planned.to(), tmp.path().join("Futures_conv/SP500_micro_20110900.csv"));
        assert!(src.join("ES-2011U.csv").exists());
        assert!(!tmp.path().join("Futures_conv").exists());
    }

    #[test]
    fn execute_moves_file() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("Futures");
        fs::create_dir(&src).unwrap();
        fs::create_dir(tmp.path().join("Futures_conv")).unwrap();
        fs::write(src.join("ES-2011U.csv"), "payload").unwrap();

        let r = FileRelocator::new(&src);
        let moved = r.relocate("ES-2011U.csv", &key(), false).unwrap();
        assert!(matches!(moved, Relocation::Moved { .. }));
        assert!(!src.join("ES-2011U.csv").exists());
        assert_eq!(fs::read_to_string(moved.to()).unwrap(), "payload");
    }

    #[test]
    fn precondition_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("Futures");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("ES-2011U.csv"), "new").unwrap();
        let r = FileRelocator::new(&src);

        assert!(matches!(
            r.relocate("ES-2011U.csv", &key(), false),
            Err(RelocationError::DestinationDirMissing(_))
        ));

        fs::create_dir(r.dest_dir()).unwrap();
        assert!(matches!(
            r.relocate("ET-2011U.csv", &key(), false),
            Err(RelocationError::SourceMissing(_))
        ));

        fs::write(r.destination_for(&key()), "old").unwrap();
        assert!(matches!(
            r.relocate("ES-2011U.csv", &key(), false),
            Err(RelocationError::DestinationExists(_))
        ));
        assert_eq!(fs::read_to_string(r.destination_for(&key())).unwrap(), "old");
        assert!(src.join("ES-2011U.csv").exists());
    }
}
