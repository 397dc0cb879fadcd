//! # contract: interfaces to the remote authority and the object store
//!
//! This module defines the two traits the pipeline consumes — [`Reconciler`]
//! for the manifest round-trip and [`ObjectStore`] for destination writes —
//! together with the plain data types that cross them.
//!
//! ## Interface & Extensibility
//! - Implement [`Reconciler`] and [`ObjectStore`] to target a real server
//!   (see the `ellx-sync` CLI crate's reqwest client) or a test double.
//! - All methods are async; errors are concrete for the reconcile exchange
//!   and boxed for destination writes.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so integration tests can
//!   generate deterministic mocks (enabled by the `test-export-mocks`
//!   feature, on by default).

use async_trait::async_trait;

use mockall::{automock, predicate::*};

use crate::error::ReconcileError;

/// One manifest line offered to the authority: a normalized server path and
/// the fingerprint of the file's current bytes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub hash: String,
}

/// The authority's answer for one file it wants transferred: the offered
/// path and an opaque write target, usable exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDirective {
    pub path: String,
    pub destination: String,
}

/// Result of one destination write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub path: String,
    pub ok: bool,
    /// Diagnostic payload for failed writes.
    pub detail: Option<String>,
}

/// The remote authority deciding which offered files need transfer.
///
/// One synchronous request/response exchange per run. Implementors must
/// surface the authority's own diagnostic unmodified on a non-success
/// response; the pipeline never retries.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Offer the full manifest; receive the subset to transfer, each with
    /// its destination.
    async fn reconcile(
        &self,
        manifest: &[ManifestEntry],
    ) -> Result<Vec<TransferDirective>, ReconcileError>;
}

/// Object storage accepting one write per destination.
///
/// No read-back or checksum verification: the transport's own integrity
/// guarantees are trusted.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` to `destination` with the given content type.
    async fn put(
        &self,
        destination: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
