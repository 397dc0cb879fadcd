//! Error taxonomy for a sync run.
//!
//! Scan and reconcile failures are fatal and stop the run before any later
//! phase executes. Individual upload failures are not: every directive is
//! attempted, and the failures are carried in the aggregate
//! [`SyncError::UploadsFailed`] verdict once all outcomes are in.

use thiserror::Error;

use crate::contract::TransferOutcome;

/// Failure talking to, or being answered badly by, the sync authority.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The round-trip itself failed (unreachable host, timeout). Never
    /// retried: re-running the whole sync is cheap and idempotent.
    #[error("transport failure reaching the sync authority: {0}")]
    Transport(String),

    /// The authority answered with a non-success status. `detail` is the
    /// server's own diagnostic, surfaced verbatim.
    #[error("sync authority rejected the manifest (status {status}): {detail}")]
    Protocol { status: u16, detail: String },

    /// The authority returned a directive that violates the offered
    /// manifest. Uploading anyway could push the wrong content, so the run
    /// aborts before any transfer.
    #[error("directive for {path} violates the offered manifest: {reason}")]
    Directive { path: String, reason: String },
}

/// Top-level failure of a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local enumeration or read failure. Fatal before any network call:
    /// an incomplete manifest would leave the remote store stale.
    #[error("failed to scan local tree: {0}")]
    Scan(#[from] std::io::Error),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// One or more destination writes failed. All directives were still
    /// attempted; `failures` holds every non-ok outcome.
    #[error("{} of {attempted} uploads failed", failures.len())]
    UploadsFailed {
        failures: Vec<TransferOutcome>,
        attempted: usize,
    },
}
