// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Presence-based deduplication.
//
// The output folder is the only record of what has been done: an input is
// finished exactly when an output with the identical filename exists. There
// is no manifest, so deleting an output makes the next scan redo that item.
// Outputs are written through a temporary file and renamed into place (see
// `storage`), which keeps a half-written file from counting as done.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use textlift_core::error::Result;
use tracing::debug;

/// Snapshot of the filenames present in the output folder.
#[derive(Debug, Clone)]
pub struct DedupTracker {
    output_dir: PathBuf,
    existing: HashSet<OsString>,
}

impl DedupTracker {
    /// List `output_dir` and remember every entry name.
    pub fn scan(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        let mut existing = HashSet::new();
        for entry in std::fs::read_dir(output_dir)? {
            existing.insert(entry?.file_name());
        }
        debug!(dir = %output_dir.display(), outputs = existing.len(), "Output folder listed");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            existing,
        })
    }

    /// True iff an output named exactly `item_name` already exists.
    pub fn should_skip(&self, item_name: &str) -> bool {
        self.existing.contains(OsStr::new(item_name))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_exact_filename_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();

        let tracker = DedupTracker::scan(dir.path()).unwrap();
        assert!(tracker.should_skip("a.png"));
        assert!(!tracker.should_skip("a.jpg"));
        assert!(!tracker.should_skip("b.png"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn deleted_output_is_no_longer_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.png");
        std::fs::write(&output, b"x").unwrap();
        assert!(DedupTracker::scan(dir.path()).unwrap().should_skip("a.png"));

        std::fs::remove_file(&output).unwrap();
        let tracker = DedupTracker::scan(dir.path()).unwrap();
        assert!(!tracker.should_skip("a.png"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn missing_output_dir_is_an_error() {
        assert!(DedupTracker::scan("/nonexistent/textlift/out").is_err());
    }
}
