//! Recursive enumeration of the local tree.
//!
//! The scanner walks a root directory depth-first and yields every regular
//! file that does not fall under an excluded prefix (version-control
//! metadata, typically). The whole listing is materialized before anything
//! downstream runs: the manifest sent to the authority must describe the
//! complete tree, so any enumeration failure aborts the scan rather than
//! producing a partial result.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Walks a directory tree, pruning excluded prefixes.
pub struct Scanner {
    root: PathBuf,
    /// Raw string prefixes of the root-relative path to skip.
    exclude_prefixes: Vec<String>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_prefixes: Vec::new(),
        }
    }

    /// Add a root-relative prefix to exclude.
    ///
    /// The prefix is matched against the raw root-relative path string, not
    /// component-wise: `.git` also covers siblings such as `.gitignore` and
    /// `.github`.
    #[must_use]
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.exclude_prefixes.push(prefix.into());
        self
    }

    /// Enumerate all regular files under the root.
    ///
    /// Directory listings are sorted, so the output order is reproducible
    /// regardless of filesystem iteration order.
    ///
    /// # Errors
    /// Any I/O failure during traversal is returned as-is; no partial
    /// listing is ever produced.
    pub fn scan(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.walk(&self.root, &mut files)?;
        debug!(root = %self.root.display(), count = files.len(), "scan complete");
        Ok(files)
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<_>>()?;
        entries.sort();

        for path in entries {
            if self.is_excluded(&path) {
                debug!(path = %path.display(), "skipping excluded path");
                continue;
            }
            let meta = std::fs::metadata(&path)?;
            if meta.is_dir() {
                self.walk(&path, files)?;
            } else {
                files.push(path);
            }
        }
        Ok(())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let mut joined = String::new();
        for component in relative.components() {
            if !joined.is_empty() {
                joined.push('/');
            }
            joined.push_str(&component.as_os_str().to_string_lossy());
        }
        self.exclude_prefixes
            .iter()
            .any(|prefix| joined.starts_with(prefix.as_str()))
    }
}
