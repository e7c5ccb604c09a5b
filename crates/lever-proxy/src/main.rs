use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lever_core::{Config, OpenAIClient};
use lever_proxy::Server;

#[derive(Parser)]
#[command(name = "lever-proxy")]
#[command(author, version, about = "Forward chat prompts to the upstream completion service", long_about = None)]
struct Cli {
    /// Address to listen on (e.g. 127.0.0.1:3000)
    #[arg(long, env = "LEVER_BIND")]
    bind: Option<String>,

    /// Base URL of the upstream completion service
    #[arg(long, env = "LEVER_UPSTREAM_URL")]
    upstream_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("ignoring config file: {e}");
            Config::new()
        }),
    };

    let api_key = config.api_key()?;
    let upstream_url = cli
        .upstream_url
        .as_deref()
        .unwrap_or_else(|| config.upstream_url());
    let bind = cli.bind.as_deref().unwrap_or_else(|| config.bind_addr());

    let client = OpenAIClient::new(api_key, upstream_url);
    info!("forwarding prompts to {}", client.url());

    Server::new(Arc::new(client))
        .run(bind, shutdown_signal())
        .await
        .with_context(|| format!("proxy server on {bind} failed"))?;

    info!("proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
