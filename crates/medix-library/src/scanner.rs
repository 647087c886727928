use std::{
    fs::{self, DirEntry},
    path::{Path, PathBuf},
};

use medix_probe::{MediaFile, ProbeError};
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    error::LibraryError,
    extensions::{Classification, ExtensionTable},
    table::SummaryTable,
};

/// A recognised file that could not be analyzed. The scanner also logs one `warn!` line for it.
#[derive(Debug)]
pub struct ScanFailure {
    pub name: String,
    pub path: PathBuf,
    pub error: ProbeError,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub table: SummaryTable,
    pub failures: Vec<ScanFailure>,
    /// Entries ignored because of their extension or because they aren't regular files.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Scanner {
    extensions: ExtensionTable,
}

impl Scanner {
    pub fn new(extensions: ExtensionTable) -> Self {
        Scanner { extensions }
    }

    /// Analyzes the immediate entries of `dir` in the order the filesystem reports them.
    /// A file that fails is logged and recorded; only an unreadable `dir` is an error.
    #[instrument(level = Level::INFO, skip(self), fields(dir = %dir.display()))]
    pub fn scan(&self, dir: &Path) -> Result<ScanOutcome, LibraryError> {
        let entries = fs::read_dir(dir).map_err(|source| LibraryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut outcome = ScanOutcome::default();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "read_dir entry error");
                    continue;
                }
            };

            let Some(file) = self.media_file(&entry) else {
                outcome.skipped += 1;
                continue;
            };

            match file.analyze() {
                Ok(descriptor) => outcome.table.push(descriptor.summary()),
                Err(error) => {
                    warn!(file = %file.name(), %error, "failed to analyze media file");
                    outcome.failures.push(ScanFailure {
                        name: file.name().to_string(),
                        path: file.path().to_path_buf(),
                        error,
                    });
                }
            }
        }

        info!(
            rows = outcome.table.len(),
            failures = outcome.failures.len(),
            skipped = outcome.skipped,
            "scan complete"
        );

        Ok(outcome)
    }

    fn media_file(&self, entry: &DirEntry) -> Option<MediaFile> {
        let path = entry.path();

        let Classification::Media(kind) = self.extensions.classify(&path) else {
            debug!(path = %path.display(), "unsupported extension");
            return None;
        };

        // Symlinks are followed; metadata errors are left for `analyze` to report.
        if let Ok(md) = fs::metadata(&path) {
            if !md.is_file() {
                debug!(path = %path.display(), "not a regular file");
                return None;
            }
        }

        Some(MediaFile::new(path, kind))
    }
}
