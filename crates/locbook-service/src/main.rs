//! locbook - OwnTracks receiver and location-history heatmap.
//!
//! Run with: `cargo run -p locbook-service`

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use locbook_service::{AppState, Config, api, commands};
use locbook_store::HistoryStore;

/// locbook - Collect OwnTracks locations into a heatmap.
#[derive(Parser, Debug)]
#[command(name = "locbook")]
#[command(version, about, long_about = None)]
struct Args {
    /// Import a Google location-history export, then exit.
    #[arg(short, long, value_name = "FILE")]
    import_google: Option<PathBuf>,

    /// Export the full history as GeoJSON, then exit.
    #[arg(short, long, value_name = "FILE")]
    export_geojson: Option<PathBuf>,

    /// Port to listen on, on all interfaces (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log to this file instead of the terminal.
    #[arg(short, long, value_name = "FILE")]
    logfile: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// History snapshot path (overrides config).
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.logfile.as_ref())?;

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // Override config with CLI args
    if let Some(port) = args.port {
        config.server.set_port(port);
    }
    if let Some(history_path) = args.history {
        config.storage.history_path = history_path;
    }
    config.validate()?;

    let mut history = HistoryStore::load(&config.storage.history_path)
        .context("Cannot start with an unreadable history")?;

    if args.import_google.is_some() || args.export_geojson.is_some() {
        if let Some(path) = &args.import_google {
            let count = commands::import_google(&mut history, &config, path)?;
            info!("{} items imported from {}", count, path.display());
        }
        if let Some(path) = &args.export_geojson {
            commands::export_geojson(&history, path)?;
        }
        return Ok(());
    }

    run_server(history, config).await
}

/// Log filter used when `RUST_LOG` is unset or empty.
const DEFAULT_LOG_FILTER: &str =
    "locbook_service=info,locbook_store=info,locbook_core=info,tower_http=debug";

/// Build the log filter. A non-empty `RUST_LOG` replaces the defaults entirely.
fn log_filter(rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    let directives = match rust_log.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_LOG_FILTER,
    };
    EnvFilter::try_new(directives).with_context(|| format!("Invalid log filter '{}'", directives))
}

fn init_logging(logfile: Option<&PathBuf>) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref())?;

    match logfile {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

async fn run_server(history: HistoryStore, config: Config) -> anyhow::Result<()> {
    info!(
        "Loaded {} points ({} observations)",
        history.size(),
        history.observation_count()
    );

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse()?;

    // Create application state
    let state = AppState::new(history, config);

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
