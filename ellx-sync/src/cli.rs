use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ellx_sync_core::error::SyncError;
use ellx_sync_core::synchronise::{synchronise, SyncOptions};

use crate::client::{HttpRemote, SyncMetadata};
use crate::load_config::load_remote_config;

#[derive(Parser)]
#[clap(
    name = "ellx-sync",
    version,
    about = "Publish a local file tree to an Ellx-compatible content server"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Offer the tree's fingerprints to the server and upload what it lacks
    Sync {
        /// Root of the tree to sync
        #[clap(long, default_value = ".")]
        root: PathBuf,
        /// Root-relative prefixes to leave out (repeatable)
        #[clap(long = "exclude", default_value = ".git")]
        exclude: Vec<String>,
        /// Title shown for the synced project; defaults to the project name
        #[clap(long)]
        title: Option<String>,
        /// Project visibility
        #[clap(long, default_value = "public")]
        acl: String,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync {
            root,
            exclude,
            title,
            acl,
        } => {
            let config = load_remote_config()?;
            let metadata = SyncMetadata {
                title: title.unwrap_or_else(|| config.project.clone()),
                acl,
            };
            let remote = HttpRemote::new(config, metadata);
            let options = SyncOptions {
                root,
                exclude_prefixes: exclude,
            };

            match synchronise(&options, &remote, &remote).await {
                Ok(report) => {
                    if report.transferred.is_empty() {
                        println!("Already in sync ({} files offered).", report.offered);
                    } else {
                        println!("Synced following files successfully:\n");
                        for path in &report.transferred {
                            println!("{}", path.trim_start_matches('/'));
                        }
                    }
                    Ok(())
                }
                Err(SyncError::UploadsFailed {
                    failures,
                    attempted,
                }) => {
                    eprintln!("Error uploading files ({} of {attempted}):", failures.len());
                    for outcome in &failures {
                        eprintln!(
                            "  {}: {}",
                            outcome.path,
                            outcome.detail.as_deref().unwrap_or("unknown failure")
                        );
                    }
                    Err(anyhow::anyhow!(
                        "{} of {attempted} uploads failed",
                        failures.len()
                    ))
                }
                // Fatal errors surface once, through the Result main returns.
                Err(e) => Err(e.into()),
            }
        }
    }
}
