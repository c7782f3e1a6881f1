//! UBKG auth server
//!
//! Usage:
//!   ubkg-auth --config /path/to/auth.yaml [--bind 0.0.0.0:8080]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use ubkg_auth::{router, AuthConfig, AuthState, UmlsHttpValidator};

#[derive(Parser, Debug)]
#[command(name = "ubkg-auth", version, about = "UMLS API key validation for UBKG")]
struct Args {
    /// YAML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_tracing_subscriber();
    let args = Args::parse();

    let config = AuthConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    tracing::info!(validate_url = %config.umls_validate_url, "configuration loaded");

    let validator = Arc::new(UmlsHttpValidator::new(config.umls_validate_url));
    let app = router(AuthState::new(validator));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    tracing::info!(addr = %args.bind, version = env!("CARGO_PKG_VERSION"), "ubkg-auth listening");

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
