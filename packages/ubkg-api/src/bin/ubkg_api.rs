//! UBKG API server
//!
//! Usage:
//!   ubkg-api --config /path/to/app.yaml [--bind 0.0.0.0:5002]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use ubkg_api::neo4j::Neo4jConnection;
use ubkg_api::response::ResponseAssembler;
use ubkg_api::{router, AppConfig, AppState};

#[derive(Parser, Debug)]
#[command(name = "ubkg-api", version, about = "REST API over the UBKG graph database")]
struct Args {
    /// YAML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:5002")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_tracing_subscriber();
    let args = Args::parse();

    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let client = Neo4jConnection::create(&config)
        .await
        .context("connecting to the graph database")?;

    let template_source = match &config.templates_dir {
        Some(dir) => dir.display().to_string(),
        None => "built-in".to_string(),
    };
    tracing::info!(
        timeout_ms = client.timeout_ms(),
        large_response_threshold = config.large_response_threshold,
        templates = %template_source,
        s3_bucket = ?config.s3.as_ref().map(|s3| s3.bucket_name.as_str()),
        "configuration loaded"
    );
    if config.s3.is_some() {
        tracing::warn!("no response stash is compiled in; oversized responses are refused with 403");
    }

    let assembler = ResponseAssembler::new(config.large_response_threshold, None, client.timeout_ms());
    let package_base_dir = config
        .package_base_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let state = AppState::new(Arc::new(client), assembler, package_base_dir);
    let app = router(state);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    tracing::info!(addr = %args.bind, version = env!("CARGO_PKG_VERSION"), "ubkg-api listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => tracing::error!(?err, "failed to listen for shutdown signal"),
    }
}

fn install_tracing_subscriber() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
