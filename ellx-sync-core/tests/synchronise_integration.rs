use std::fs;

use tempfile::tempdir;

use ellx_sync_core::contract::{
    ManifestEntry, MockObjectStore, MockReconciler, TransferDirective,
};
use ellx_sync_core::error::{ReconcileError, SyncError};
use ellx_sync_core::snapshot::fingerprint;
use ellx_sync_core::synchronise::{synchronise, SyncOptions};

fn options_for(root: &std::path::Path) -> SyncOptions {
    SyncOptions {
        root: root.to_path_buf(),
        exclude_prefixes: vec![".git".into()],
    }
}

#[tokio::test]
async fn uploads_only_the_files_the_authority_requests() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "x").unwrap();
    fs::write(dir.path().join("b.md"), "y").unwrap();

    // Authority already holds a.js's content and asks only for b.md.
    let mut reconciler = MockReconciler::new();
    reconciler
        .expect_reconcile()
        .withf(|manifest: &[ManifestEntry]| {
            let paths: Vec<&str> = manifest.iter().map(|e| e.path.as_str()).collect();
            paths == ["/a.js", "/b.md"] && manifest[1].hash == fingerprint(b"y")
        })
        .return_once(|_| {
            Ok(vec![TransferDirective {
                path: "/b.md".into(),
                destination: "https://store.example/b.md?sig=abc".into(),
            }])
        });

    let mut store = MockObjectStore::new();
    store
        .expect_put()
        .times(1)
        .withf(|destination, content_type, body| {
            destination == "https://store.example/b.md?sig=abc"
                && content_type == "text/plain"
                && body == b"y"
        })
        .returning(|_, _, _| Ok(()));

    let report = synchronise(&options_for(dir.path()), &reconciler, &store)
        .await
        .expect("run should succeed");

    assert_eq!(report.offered, 2);
    assert_eq!(report.transferred, vec!["/b.md".to_string()]);
}

#[tokio::test]
async fn empty_directive_set_means_zero_uploads_and_success() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "x").unwrap();
    fs::write(dir.path().join("b.md"), "y").unwrap();

    let mut reconciler = MockReconciler::new();
    reconciler.expect_reconcile().return_once(|_| Ok(vec![]));

    let mut store = MockObjectStore::new();
    store.expect_put().times(0);

    let report = synchronise(&options_for(dir.path()), &reconciler, &store)
        .await
        .expect("an up-to-date tree should sync cleanly");

    assert_eq!(report.offered, 2);
    assert!(report.transferred.is_empty());
}

#[tokio::test]
async fn transport_failure_fails_fast_without_any_upload_attempt() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "x").unwrap();

    let mut reconciler = MockReconciler::new();
    reconciler
        .expect_reconcile()
        .return_once(|_| Err(ReconcileError::Transport("connection timed out".into())));

    let mut store = MockObjectStore::new();
    store.expect_put().times(0);

    let err = synchronise(&options_for(dir.path()), &reconciler, &store)
        .await
        .expect_err("transport failure must abort the run");

    assert!(matches!(
        err,
        SyncError::Reconcile(ReconcileError::Transport(_))
    ));
}

#[tokio::test]
async fn authority_diagnostic_is_surfaced_verbatim() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "x").unwrap();

    let mut reconciler = MockReconciler::new();
    reconciler.expect_reconcile().return_once(|_| {
        Err(ReconcileError::Protocol {
            status: 403,
            detail: "project quota exceeded".into(),
        })
    });

    let mut store = MockObjectStore::new();
    store.expect_put().times(0);

    let err = synchronise(&options_for(dir.path()), &reconciler, &store)
        .await
        .expect_err("protocol failure must abort the run");

    assert!(err.to_string().contains("project quota exceeded"));
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn directive_for_unoffered_path_aborts_before_any_upload() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "x").unwrap();

    let mut reconciler = MockReconciler::new();
    reconciler.expect_reconcile().return_once(|_| {
        Ok(vec![TransferDirective {
            path: "/ghost.txt".into(),
            destination: "https://store.example/ghost".into(),
        }])
    });

    let mut store = MockObjectStore::new();
    store.expect_put().times(0);

    let err = synchronise(&options_for(dir.path()), &reconciler, &store)
        .await
        .expect_err("unknown path is a protocol violation");

    match err {
        SyncError::Reconcile(ReconcileError::Directive { path, .. }) => {
            assert_eq!(path, "/ghost.txt");
        }
        other => panic!("expected a directive violation, got: {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_directive_aborts_before_any_upload() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "x").unwrap();

    let mut reconciler = MockReconciler::new();
    reconciler.expect_reconcile().return_once(|_| {
        let directive = TransferDirective {
            path: "/a.js".into(),
            destination: "https://store.example/a".into(),
        };
        Ok(vec![directive.clone(), directive])
    });

    let mut store = MockObjectStore::new();
    store.expect_put().times(0);

    let err = synchronise(&options_for(dir.path()), &reconciler, &store)
        .await
        .expect_err("duplicate directives violate the contract");

    assert!(matches!(
        err,
        SyncError::Reconcile(ReconcileError::Directive { .. })
    ));
}

#[tokio::test]
async fn one_failed_upload_fails_the_run_but_every_upload_is_attempted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("good.md"), "fine").unwrap();
    fs::write(dir.path().join("bad.md"), "rejected").unwrap();

    let mut reconciler = MockReconciler::new();
    reconciler.expect_reconcile().return_once(|_| {
        Ok(vec![
            TransferDirective {
                path: "/good.md".into(),
                destination: "https://store.example/good".into(),
            },
            TransferDirective {
                path: "/bad.md".into(),
                destination: "https://store.example/bad".into(),
            },
        ])
    });

    let mut store = MockObjectStore::new();
    store
        .expect_put()
        .times(2)
        .returning(|destination, _, _| {
            if destination.ends_with("/bad") {
                Err("destination returned 500: internal error".into())
            } else {
                Ok(())
            }
        });

    let err = synchronise(&options_for(dir.path()), &reconciler, &store)
        .await
        .expect_err("a single failed upload must fail the verdict");

    match err {
        SyncError::UploadsFailed {
            failures,
            attempted,
        } => {
            assert_eq!(attempted, 2);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].path, "/bad.md");
            assert!(!failures[0].ok);
            assert!(failures[0]
                .detail
                .as_deref()
                .unwrap()
                .contains("internal error"));
        }
        other => panic!("expected UploadsFailed, got: {other:?}"),
    }
}
