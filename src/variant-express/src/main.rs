//! Variant Express — A/B landing page decision service.
//!
//! Main entry point that loads configuration, builds the bandit agent and
//! starts the HTTP server.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use variant_api::ApiServer;
use variant_core::config::AppConfig;
use variant_rl_engine::EpsilonGreedyAgent;

#[derive(Parser, Debug)]
#[command(name = "variant-express")]
#[command(about = "A/B landing page decision service backed by an epsilon-greedy bandit")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still take precedence)
    #[arg(short, long, env = "VARIANT_EXPRESS_CONFIG")]
    config: Option<PathBuf>,

    /// Node identifier (overrides config)
    #[arg(long, env = "VARIANT_EXPRESS__NODE_ID")]
    node_id: Option<String>,

    /// Bind address (overrides config)
    #[arg(long, env = "VARIANT_EXPRESS__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "VARIANT_EXPRESS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Exploration probability in [0, 1] (overrides config)
    #[arg(long, env = "VARIANT_EXPRESS__AGENT__EPSILON")]
    epsilon: Option<f64>,

    /// Comma-separated variant labels (overrides config)
    #[arg(long, value_delimiter = ',', env = "VARIANT_EXPRESS__AGENT__ARMS")]
    arms: Option<Vec<String>>,

    /// Number of balanced warm-up choices (overrides config)
    #[arg(long, env = "VARIANT_EXPRESS__AGENT__COLD_START_SIZE")]
    cold_start_size: Option<usize>,

    /// Fixed RNG seed for reproducible runs
    #[arg(long, env = "VARIANT_EXPRESS__AGENT__SEED")]
    seed: Option<u64>,

    /// Directory holding the landing page assets
    #[arg(long, env = "VARIANT_EXPRESS__FRONTEND__STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "variant_express=info,variant_api=info,variant_rl_engine=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Variant Express starting up");

    let mut config = AppConfig::load(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(epsilon) = cli.epsilon {
        config.agent.epsilon = epsilon;
    }
    if let Some(arms) = cli.arms {
        config.agent.arms = arms;
    }
    if let Some(size) = cli.cold_start_size {
        config.agent.cold_start_size = size;
    }
    if let Some(seed) = cli.seed {
        config.agent.seed = Some(seed);
    }
    if let Some(dir) = cli.static_dir {
        config.frontend.static_dir = Some(dir);
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        epsilon = config.agent.epsilon,
        arms = ?config.agent.arms,
        cold_start_size = config.agent.cold_start_size,
        seeded = config.agent.seed.is_some(),
        "Configuration loaded"
    );

    // Build the shared agent; invalid agent settings abort startup.
    let agent = Arc::new(EpsilonGreedyAgent::new(&config.agent)?);

    let api_server = ApiServer::new(config, agent);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Variant Express is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
