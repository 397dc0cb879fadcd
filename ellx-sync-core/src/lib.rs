#![doc = "ellx-sync-core: core pipeline library for ellx-sync."]

//! This crate contains the whole reconcile-then-upload pipeline: tree
//! scanning, content snapshotting and fingerprinting, the remote authority
//! and object store contracts, and the synchronise orchestration.
//! Network clients live in the `ellx-sync` CLI crate and plug in through
//! the traits in [`contract`].

pub mod contract;
pub mod error;
pub mod scan;
pub mod snapshot;
pub mod synchronise;
