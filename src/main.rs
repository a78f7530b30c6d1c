//! Cookie path rewriting proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ axum server ──▶ forward_handler ───────┼──▶ Upstream
//!                              │                                          │
//!     Client Response          │                   ┌──────────────────┐   │
//!     ◀────────────────────────┼── TraceLayer ◀────│ CookiePathLayer  │◀──┼─── Response
//!                              │                   │  (Set-Cookie     │   │
//!                              │                   │   Path rewrite)  │   │
//!                              │                   └──────────────────┘   │
//!                              │  config (TOML) ─▶ RuleSet ─▶ ArcSwap     │
//!                              └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use cookie_path_rewrite::config::{load_config, watcher::ConfigWatcher, LoadedConfig};
use cookie_path_rewrite::lifecycle::Shutdown;
use cookie_path_rewrite::observability::logging;
use cookie_path_rewrite::{HttpServer, ProxyConfig, RuleSet};

#[derive(Parser, Debug)]
#[command(name = "cookie-path-rewrite")]
#[command(author, version, about = "Rewrites Set-Cookie paths on proxied responses")]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Reload cookie path rules when the configuration file changes
    #[arg(long)]
    watch: bool,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_config(path)?,
        None => LoadedConfig {
            config: ProxyConfig::default(),
            rules: RuleSet::default(),
        },
    };

    let observability = &loaded.config.observability;
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| observability.log_level.clone());
    logging::init(&log_level, args.json_logs || observability.json_logs);

    tracing::info!(
        config = ?args.config,
        bind_address = %loaded.config.listener.bind_address,
        upstream = %loaded.config.upstream.address,
        rules = loaded.rules.len(),
        "Configuration loaded"
    );

    if args.validate {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let listener = TcpListener::bind(&loaded.config.listener.bind_address).await?;

    // Held for the lifetime of the process; dropping it stops the watch.
    let (_watcher, updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_signal());

    let server = HttpServer::new(loaded)?;
    server.run(listener, updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
