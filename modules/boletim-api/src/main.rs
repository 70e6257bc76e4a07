use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use boletim_api::{build_router, AppState, Config};
use seduc_client::SeducClient;

#[derive(Parser)]
#[command(name = "boletim-api", about = "JSON API for SEDUC-PA boletins")]
struct Cli {
    /// Bind address (overrides WEB_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides WEB_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.web_host = host;
    }
    if let Some(port) = cli.port {
        config.web_port = port;
    }
    config.log();

    let client = SeducClient::new(config.portal())?;
    let state = Arc::new(AppState {
        client,
        cache_max_age_secs: config.cache_max_age_secs,
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Boletim API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
