//! Command-line surface of the `prerender-edge` binary.
//!
//! Argument parsing and the synchronous subcommands live here so they can be
//! exercised without spawning the binary; `main.rs` only wires them to stdio.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::PrerenderConfig;
use crate::edge::{EdgeEvent, EventError};
use crate::handler::Stage;
use crate::routing::TaggerError;

#[derive(Debug, Parser)]
#[command(name = "prerender-edge")]
#[command(about = "Crawler detection and prerender routing for edge request handlers", long_about = None)]
pub struct Cli {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve both stages over HTTP
    Serve {
        /// Reload the pipeline when the config file changes
        #[arg(long)]
        watch: bool,
    },
    /// Run one stage against a platform event and print the resulting request
    Invoke {
        #[arg(value_enum)]
        stage: Stage,

        /// Event JSON file; stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Validate the configuration and print the effective settings
    CheckConfig,
}

/// Failure of a CLI subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("malformed event: {0}")]
    MalformedEvent(#[source] serde_json::Error),

    #[error(transparent)]
    Handler(#[from] TaggerError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("failed to render output: {0}")]
    Render(String),
}

/// Run `stage` against the raw event JSON and return the resulting request,
/// pretty-printed.
pub fn invoke_event(config: &PrerenderConfig, stage: Stage, raw: &str) -> Result<String, CliError> {
    let event: EdgeEvent = serde_json::from_str(raw).map_err(CliError::MalformedEvent)?;
    let handler = stage.build(config)?;
    let request = handler.handle_event(event)?;

    serde_json::to_string_pretty(&request).map_err(|e| CliError::Render(e.to_string()))
}

/// Effective configuration as TOML. The token is never included.
pub fn render_config(config: &PrerenderConfig) -> Result<String, CliError> {
    toml::to_string_pretty(config).map_err(|e| CliError::Render(e.to_string()))
}

/// Warning for `check-config` when the viewer-request stage could not start.
pub fn token_warning(config: &PrerenderConfig) -> Option<String> {
    config.tagger.token.is_none().then(|| {
        format!(
            "warning: {} is not set; the viewer-request stage cannot start",
            config.tagger.token_env
        )
    })
}
