//! Assembles the remote-authority configuration from the environment.
//!
//! This is the only place credentials are touched. The core pipeline treats
//! the authorization token as an opaque string; it is assembled here from
//! its parts and attached to every reconcile request by the client.
//!
//! # Environment
//! - `ELLX_PROJECT` — sync target as `owner/name`; falls back to
//!   `GITHUB_REPOSITORY` so the tool works unconfigured inside a GitHub
//!   Actions job.
//! - `ELLX_URL` — server base URL, default `https://api.ellx.io`.
//! - `ELLX_KEY` — API key (required).
//! - `ELLX_TS` — token timestamp component (required).
//!
//! # Errors
//! All errors use `anyhow::Error` for context-rich diagnostics, surfaced at
//! the CLI boundary.

use anyhow::{anyhow, Result};
use std::env;
use tracing::info;

const DEFAULT_SERVER: &str = "https://api.ellx.io";

/// Everything the HTTP client needs to talk to the authority.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Server base URL, no trailing slash.
    pub server: String,
    /// Sync target, `owner/name`.
    pub project: String,
    /// Opaque credential attached to the reconcile request.
    pub authorization: String,
}

/// Build the opaque authorization token from its parts.
///
/// Format: `owner,owner-name,ts,key` — the owner, the project with its
/// first `/` replaced by `-`, the timestamp component, and the API key.
pub fn authorization_token(project: &str, ts: &str, key: &str) -> String {
    let owner = project.split('/').next().unwrap_or(project);
    format!("{owner},{},{ts},{key}", project.replacen('/', "-", 1))
}

/// Load the remote configuration from the environment.
pub fn load_remote_config() -> Result<RemoteConfig> {
    let project = env::var("ELLX_PROJECT")
        .or_else(|_| env::var("GITHUB_REPOSITORY"))
        .map_err(|_| anyhow!("set ELLX_PROJECT (or GITHUB_REPOSITORY) to the owner/name to sync"))?;
    let server = env::var("ELLX_URL").unwrap_or_else(|_| DEFAULT_SERVER.to_string());
    let key = env::var("ELLX_KEY").map_err(|_| anyhow!("ELLX_KEY must be set"))?;
    let ts = env::var("ELLX_TS").map_err(|_| anyhow!("ELLX_TS must be set"))?;

    let server = server.trim_end_matches('/').to_string();
    info!(server = %server, project = %project, "Loaded remote configuration");

    Ok(RemoteConfig {
        authorization: authorization_token(&project, &ts, &key),
        server,
        project,
    })
}
