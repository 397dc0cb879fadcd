//! # HTTP client (CLI <-> core)
//!
//! The reqwest implementation of both core contracts: [`Reconciler`] for
//! the manifest round-trip against the Ellx server, and [`ObjectStore`]
//! for the per-file destination writes the server hands back.
//!
//! Wire protocol:
//! - `PUT {server}/sync/{project}` with body
//!   `{ "files": [{ "path", "hash" }…], "title", "acl" }` and the opaque
//!   token in the `authorization` header. A 2xx answer is a JSON array of
//!   `{ "path", "uploadUrl" }`.
//! - Each `uploadUrl` takes one `PUT` of the file bytes with the inferred
//!   `Content-Type` and a year-long `Cache-Control` (destinations are
//!   content-addressed, so stale caching is impossible).

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use ellx_sync_core::contract::{ManifestEntry, ObjectStore, Reconciler, TransferDirective};
use ellx_sync_core::error::ReconcileError;

use crate::load_config::RemoteConfig;

/// Descriptive metadata sent alongside the manifest.
#[derive(Debug, Clone)]
pub struct SyncMetadata {
    pub title: String,
    /// Visibility of the synced project (`public` or `private`).
    pub acl: String,
}

pub struct HttpRemote {
    http: reqwest::Client,
    config: RemoteConfig,
    metadata: SyncMetadata,
}

#[derive(Serialize)]
struct SyncRequest<'a> {
    files: &'a [ManifestEntry],
    title: &'a str,
    acl: &'a str,
}

#[derive(Deserialize)]
struct DirectiveWire {
    path: String,
    #[serde(rename = "uploadUrl")]
    upload_url: String,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig, metadata: SyncMetadata) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            metadata,
        }
    }
}

#[async_trait]
impl Reconciler for HttpRemote {
    async fn reconcile(
        &self,
        manifest: &[ManifestEntry],
    ) -> Result<Vec<TransferDirective>, ReconcileError> {
        let url = format!("{}/sync/{}", self.config.server, self.config.project);
        info!(url = %url, files = manifest.len(), "Offering manifest to authority");

        let response = self
            .http
            .put(&url)
            .header(AUTHORIZATION, &self.config.authorization)
            .json(&SyncRequest {
                files: manifest,
                title: &self.metadata.title,
                acl: &self.metadata.acl,
            })
            .send()
            .await
            .map_err(|e| ReconcileError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Surface the server's own diagnostic untouched: prefer its
            // "error" field, fall back to the raw body.
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str().map(str::to_owned)))
                .unwrap_or(body);
            error!(status = status.as_u16(), detail = %detail, "Authority rejected the manifest");
            return Err(ReconcileError::Protocol {
                status: status.as_u16(),
                detail,
            });
        }

        let directives: Vec<DirectiveWire> = response
            .json()
            .await
            .map_err(|e| ReconcileError::Transport(e.to_string()))?;
        Ok(directives
            .into_iter()
            .map(|d| TransferDirective {
                path: d.path,
                destination: d.upload_url,
            })
            .collect())
    }
}

#[async_trait]
impl ObjectStore for HttpRemote {
    async fn put(
        &self,
        destination: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .put(destination)
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, "max-age=31536000")
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("destination returned {status}: {body}").into());
        }
        Ok(())
    }
}
