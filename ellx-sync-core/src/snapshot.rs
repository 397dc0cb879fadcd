//! In-memory snapshot of the tree: content cache plus fingerprints.
//!
//! Every file is read exactly once. The bytes that go into the fingerprint
//! are the same bytes the uploader later sends, so a file changing on disk
//! between hashing and uploading cannot desynchronise the two. The snapshot
//! has one writer epoch (capture) and one reader epoch (upload); it is never
//! mutated after capture, which is what lets the upload phase read it from
//! concurrent tasks without locking.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::contract::ManifestEntry;

/// Immutable capture of the local tree: ordered manifest plus a
/// path-to-bytes cache backing the upload phase.
#[derive(Debug, Default)]
pub struct Snapshot {
    entries: Vec<ManifestEntry>,
    contents: HashMap<String, Vec<u8>>,
}

impl Snapshot {
    /// Read, normalize and fingerprint every path yielded by the scanner.
    ///
    /// Manifest order is the order of `raw_paths`.
    ///
    /// # Errors
    /// Fails on the first unreadable file; a partial snapshot would
    /// under-report the tree to the authority.
    pub fn capture(root: &Path, raw_paths: &[impl AsRef<Path>]) -> io::Result<Self> {
        let mut snapshot = Self::default();
        for raw in raw_paths {
            snapshot.ingest(root, raw.as_ref())?;
        }
        Ok(snapshot)
    }

    fn ingest(&mut self, root: &Path, raw: &Path) -> io::Result<()> {
        let bytes = std::fs::read(raw)?;
        let path = server_path(root, raw);
        let hash = fingerprint(&bytes);
        // Write-once per path: the scanner never yields duplicates.
        debug_assert!(!self.contents.contains_key(&path));
        self.entries.push(ManifestEntry {
            path: path.clone(),
            hash,
        });
        self.contents.insert(path, bytes);
        Ok(())
    }

    /// The ordered `{path, hash}` sequence offered to the authority.
    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Cached bytes for a normalized path, if it was captured.
    pub fn bytes(&self, path: &str) -> Option<&[u8]> {
        self.contents.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.contents.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stable content fingerprint: lowercase hex SHA-256 of the exact bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Normalize a scanned path to its server form: the root is replaced by a
/// single leading `/`, separators are `/` on every platform.
pub fn server_path(root: &Path, raw: &Path) -> String {
    let relative = raw.strip_prefix(root).unwrap_or(raw);
    let mut out = String::new();
    for component in relative.components() {
        out.push('/');
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}
