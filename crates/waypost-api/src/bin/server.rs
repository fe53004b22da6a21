//! Waypost API server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), builds the
//! three registry adapters, and serves the facility API over HTTP. Every
//! setting can also come from the environment with a `WAYPOST_` prefix,
//! e.g. `WAYPOST_PORT=9000`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use waypost_api::ServerConfig;
use waypost_providers::{
  aggregate::Aggregator, hrsa::HrsaDirectory, usda::UsdaOffices, va::VaFacilities,
};

#[derive(Parser)]
#[command(author, version, about = "Waypost facility API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("WAYPOST"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Build the registry adapters and the facade over them.
  let aggregator = Arc::new(Aggregator::new(
    HrsaDirectory::new(&server_cfg.providers)
      .context("failed to build HRSA adapter")?,
    VaFacilities::new(&server_cfg.providers)
      .context("failed to build VA adapter")?,
    UsdaOffices::new(&server_cfg.providers)
      .context("failed to build USDA adapter")?,
  ));

  let app = waypost_api::api_router(aggregator)
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
