//! prerender-edge
//!
//! Edge handlers that send search-engine crawlers and link-preview bots to a
//! prerendering service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Viewer ──▶ viewer-request stage ──▶ CDN cache ──▶ origin-request stage ──▶ origin
//!              (BotTagger)                            (PrerenderRouter)
//!              adds x-prerender-*                     if tagged: origin =
//!              headers to bot traffic                 service.prerender.io
//! ```
//!
//! The binary runs either stage against a platform event locally (`invoke`),
//! serves both over HTTP (`serve`), or checks a configuration (`check-config`).

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use prerender_edge::cli::{self, Cli, Commands};
use prerender_edge::config::{load_config, load_from_env, PrerenderConfig};
use prerender_edge::config::watcher::ConfigWatcher;
use prerender_edge::handler::{Pipeline, Stage};
use prerender_edge::http::HttpServer;
use prerender_edge::lifecycle::{signals, Shutdown};
use prerender_edge::observability::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };
    init_logging(&config.observability);

    match cli.command {
        Commands::Serve { watch } => serve(config, cli.config, watch).await,
        Commands::Invoke { stage, event } => invoke(&config, stage, event),
        Commands::CheckConfig => check_config(&config),
    }
}

async fn serve(
    config: PrerenderConfig,
    config_path: Option<PathBuf>,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("prerender-edge v{} starting", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::from_config(&config)?;
    let server = HttpServer::new(&config.server, pipeline);
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    // Held for the lifetime of the server; dropping it stops the watch.
    let _watcher = match (watch, config_path.as_deref()) {
        (true, Some(path)) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            server.state().spawn_reloader(updates, shutdown.clone());
            Some(watcher.run()?)
        }
        (true, None) => {
            tracing::warn!("--watch ignored: no --config file given");
            None
        }
        (false, _) => None,
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        domain = %config.router.domain_name,
        "Listening for invocations"
    );

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn invoke(
    config: &PrerenderConfig,
    stage: Stage,
    event_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match event_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    println!("{}", cli::invoke_event(config, stage, &raw)?);
    Ok(())
}

fn check_config(config: &PrerenderConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(warning) = cli::token_warning(config) {
        eprintln!("{}", warning);
    }
    println!("{}", cli::render_config(config)?);
    Ok(())
}
