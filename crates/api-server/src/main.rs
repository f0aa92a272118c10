//! API Server Binary Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use nlp_serve_api_server::config::load_config;
use nlp_serve_api_server::{start_server, ApiState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nlp-serve")]
#[command(about = "NLP model services: nominal SRL pipeline, passthrough models, word vectors")]
#[command(version)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "nlp-serve.toml")]
    config: PathBuf,

    /// Bind host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nlp_serve_api_server=info,nlp_serve_pipeline=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    config.override_server(args.host, args.port);

    let state = ApiState::from_config(&config)
        .await
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;

    tracing::info!("Starting NLP model services");
    start_server(&config.bind_addr(), state).await?;

    Ok(())
}
