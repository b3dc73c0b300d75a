use log::warn;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::LauncherError;

/// Result of scanning one manifest directory
#[derive(Debug)]
pub struct ManifestScan<T> {
    /// Entries keyed by title, ordered by title
    pub entries: BTreeMap<String, T>,
    /// Problems that did not stop the scan
    pub issues: Vec<LauncherError>,
}

impl<T> ManifestScan<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    /// Empty result for a directory that does not exist
    pub fn missing(dir: &Path) -> Self {
        Self {
            entries: BTreeMap::new(),
            issues: vec![LauncherError::ScanDirectoryMissing(dir.to_path_buf())],
        }
    }

    /// Whether the scanned directory was absent
    pub fn is_directory_missing(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, LauncherError::ScanDirectoryMissing(_)))
    }

    pub(crate) fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let issue = LauncherError::MalformedManifestEntry {
            path: path.to_path_buf(),
            reason: reason.into(),
        };
        warn!("{}", issue);
        self.issues.push(issue);
    }

    /// Convert every entry, keeping titles and issues
    pub fn map<U>(self, mut f: impl FnMut(&str, T) -> U) -> ManifestScan<U> {
        ManifestScan {
            entries: self
                .entries
                .into_iter()
                .map(|(title, entry)| {
                    let mapped = f(&title, entry);
                    (title, mapped)
                })
                .collect(),
            issues: self.issues,
        }
    }
}

/// Files directly inside `dir`, sorted by name so repeated scans see the same order.
///
/// Unreadable directory entries are reported through `scan` and skipped.
pub(crate) fn manifest_files<T>(dir: &Path, scan: &mut ManifestScan<T>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                scan.skip(&path, e.to_string());
            }
        }
    }

    files
}
