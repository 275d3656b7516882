//! # repo-print CLI Interface (Module)
//!
//! This module implements the command-line surface of repo-print: argument parsing,
//! subcommand routing, and the async entrypoint used by both `main` and the integration tests.
//!
//! All snapshot logic (matching, filtering, rendering, assembling) lives in the
//! [`repo-print-core`] crate. This module only loads configuration, applies CLI overrides,
//! and reports the outcome.
//!
//! ## How To Use
//! - From a shell: `repo-print snapshot --config snapshot.yaml [--debug]`.
//! - Programmatically: construct a [`Cli`] and call [`run`].
//!
//! [`repo-print-core`]: ../../repo-print-core/
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use repo_print_core::snapshot::snapshot;
use repo_print_core::source::GitAcquirer;
use std::path::PathBuf;

/// CLI for repo-print: turn a repository into a filtered JSON or HTML snapshot.
#[derive(Parser)]
#[clap(
    name = "repo-print",
    version,
    about = "Snapshot selected files of a git repository or local directory as JSON records or an HTML document"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Acquire the configured source and write its snapshot to the output directory
    Snapshot {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Emit per-file diagnostics, overriding `debug` in the config file
        #[clap(long)]
        debug: bool,
    },
}

impl Cli {
    /// Whether the invocation asked for debug diagnostics on the command line.
    pub fn debug_requested(&self) -> bool {
        match &self.command {
            Commands::Snapshot { debug, .. } => *debug,
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Snapshot { config, debug } => {
            let mut config = load_config(config)?;
            if debug {
                config.options.debug = true;
            }
            config.trace_loaded();
            tracing::info!(command = "snapshot", "Starting snapshot");

            match snapshot(&config, &GitAcquirer::default()).await {
                Ok(report) => {
                    tracing::info!(command = "snapshot", ?report, "Snapshot complete");
                    println!(
                        "Snapshot complete: {} of {} files matched. Output saved to {}",
                        report.matched,
                        report.candidates,
                        config.output_dir.display()
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "snapshot", error = %e, "Snapshot failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
