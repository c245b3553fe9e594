//! Gather API server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP. Ctrl-C
//! triggers a graceful shutdown: the process-wide cancel handle fires, so
//! in-flight engine operations stop before their next write.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use gather_api::{AppState, ServerConfig};
use gather_core::{cancel::CancelHandle, clock::SystemClock};
use gather_service::ImageCache;
use gather_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Gather event-management API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("GATHER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let (cancel_handle, cancel_token) = CancelHandle::new();

  let state = AppState::new(
    Arc::new(store),
    Arc::new(ImageCache::new()),
    Arc::new(SystemClock),
    cancel_token,
  );

  let app = gather_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal(cancel_handle))
    .await
    .context("server error")?;

  Ok(())
}

/// Wait for Ctrl-C, then fire the engine-wide cancel handle so in-flight
/// operations report a cancelled outcome instead of writing.
async fn shutdown_signal(handle: CancelHandle) {
  let _ = tokio::signal::ctrl_c().await;
  tracing::info!("shutdown signal received; cancelling in-flight operations");
  handle.cancel();
}
