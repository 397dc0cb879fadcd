//! High-level pipeline: scan → fingerprint → reconcile → upload.
//!
//! This module orchestrates one full sync run:
//!   - Scans the local tree and captures an immutable [`Snapshot`] of it
//!     (one read per file, fingerprints over exactly those bytes)
//!   - Offers the snapshot's manifest to the authority via [`Reconciler`]
//!   - Validates the returned directives against the offered manifest
//!   - Fans out one upload task per directive via [`ObjectStore`], joins on
//!     all of them, and reduces the outcomes to an aggregate verdict
//!
//! # Error Handling
//! Scan and reconcile failures abort the run before any upload. Individual
//! upload failures never stop their siblings; they are collected and decide
//! the verdict only after every outcome is in (see [`SyncError`]).
//!
//! # Callable From
//! - The `ellx-sync` CLI crate, with its reqwest client implementing both
//!   traits
//! - Integration tests, with mockall doubles

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{error, info};

use crate::contract::{ObjectStore, Reconciler, TransferOutcome};
use crate::error::{ReconcileError, SyncError};
use crate::scan::Scanner;
use crate::snapshot::Snapshot;

/// What to sync: the local root and which prefixes to leave out of it.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub root: PathBuf,
    /// Root-relative prefixes excluded from the scan (e.g. `.git`).
    pub exclude_prefixes: Vec<String>,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct SyncReport {
    /// How many files the manifest offered.
    pub offered: usize,
    /// Normalized paths of the files actually transferred, in directive
    /// order.
    pub transferred: Vec<String>,
}

pub async fn synchronise<R, S>(
    options: &SyncOptions,
    reconciler: &R,
    store: &S,
) -> Result<SyncReport, SyncError>
where
    R: Reconciler,
    S: ObjectStore,
{
    info!(root = %options.root.display(), "[SYNC] Starting sync run");

    // --- Phase 1: scan and snapshot (sequential; must read to hash) ---
    let mut scanner = Scanner::new(&options.root);
    for prefix in &options.exclude_prefixes {
        scanner = scanner.exclude(prefix);
    }
    let raw_paths = scanner.scan()?;
    let snapshot = Snapshot::capture(&options.root, &raw_paths)?;
    info!(files = snapshot.len(), "[SYNC] Snapshot captured");

    // --- Phase 2: one reconcile round-trip ---
    let directives = match reconciler.reconcile(snapshot.manifest()).await {
        Ok(directives) => directives,
        Err(e) => {
            error!(error = %e, "[SYNC][ERROR] Reconciliation failed");
            return Err(e.into());
        }
    };
    info!(requested = directives.len(), "[SYNC] Authority answered");

    // The authority may only request paths it was offered, once each.
    // Checking up front means a bad directive aborts before any byte moves.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut uploads = Vec::with_capacity(directives.len());
    for directive in &directives {
        let Some(bytes) = snapshot.bytes(&directive.path) else {
            error!(path = %directive.path, "[SYNC][ERROR] Directive for path not in manifest");
            return Err(ReconcileError::Directive {
                path: directive.path.clone(),
                reason: "path was not offered in the manifest".into(),
            }
            .into());
        };
        if !seen.insert(directive.path.as_str()) {
            error!(path = %directive.path, "[SYNC][ERROR] Duplicate directive");
            return Err(ReconcileError::Directive {
                path: directive.path.clone(),
                reason: "path was requested more than once".into(),
            }
            .into());
        }
        uploads.push((directive, bytes));
    }

    // --- Phase 3: fan-out, join, reduce ---
    // The snapshot is read-only from here on, so the tasks share it freely.
    let outcomes: Vec<TransferOutcome> = join_all(uploads.into_iter().map(
        |(directive, bytes)| async move {
            let content_type = content_type_for(&directive.path);
            match store.put(&directive.destination, content_type, bytes).await {
                Ok(()) => {
                    info!(path = %directive.path, "[SYNC][UPLOAD] Transfer succeeded");
                    TransferOutcome {
                        path: directive.path.clone(),
                        ok: true,
                        detail: None,
                    }
                }
                Err(e) => {
                    error!(path = %directive.path, error = %e, "[SYNC][ERROR][UPLOAD] Transfer failed");
                    TransferOutcome {
                        path: directive.path.clone(),
                        ok: false,
                        detail: Some(e.to_string()),
                    }
                }
            }
        },
    ))
    .await;

    let attempted = outcomes.len();
    let (transferred, failures): (Vec<_>, Vec<_>) =
        outcomes.into_iter().partition(|outcome| outcome.ok);

    if failures.is_empty() {
        info!(transferred = attempted, "[SYNC] Run complete");
        Ok(SyncReport {
            offered: snapshot.len(),
            transferred: transferred.into_iter().map(|o| o.path).collect(),
        })
    } else {
        error!(
            failed = failures.len(),
            attempted, "[SYNC][ERROR] Run finished with failed uploads"
        );
        Err(SyncError::UploadsFailed {
            failures,
            attempted,
        })
    }
}

/// Content type by extension. Script files are the only recognized kind;
/// everything else, markdown included, ships as plain text.
pub fn content_type_for(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("js") | Some("ellx") => "text/javascript",
        _ => "text/plain",
    }
}
