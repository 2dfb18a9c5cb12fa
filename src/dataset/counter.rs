//! Image counting for a single class folder

use super::{DatasetError, DatasetResult};
use std::path::Path;
use walkdir::WalkDir;

/// Counts folder entries whose extension is in a fixed set (case-insensitive)
#[derive(Debug, Clone)]
pub struct ImageCounter<'a> {
    extensions: &'a [String],
}

impl<'a> ImageCounter<'a> {
    pub fn new(extensions: &'a [String]) -> Self {
        Self { extensions }
    }

    /// Whether a path carries one of the counted extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Number of matching entries directly inside `dir`.
    ///
    /// A missing folder counts as 0. Listing errors on an existing folder
    /// propagate.
    pub fn count(&self, dir: &Path) -> DatasetResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                DatasetError::io(path, source)
            })?;
            if self.matches(entry.path()) {
                count += 1;
            }
        }
        Ok(count)
    }
}
