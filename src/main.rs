//! Edge Function Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    EDGE GATEWAY                      │
//!   Request       │  ┌─────────┐   ┌────────┐   ┌─────────┐   ┌─────────┐ │
//!  ───────────────┼─▶│ /health │──▶│OPTIONS │──▶│  auth   │──▶│ routing │ │
//!                 │  └─────────┘   └────────┘   └─────────┘   └────┬────┘ │
//!                 │                                                │      │
//!                 │                                                ▼      │
//!   Response      │  ┌──────────────┐          ┌──────────────────────┐   │
//!  ◀──────────────┼──│ CORS merge / │◀─────────│ functions registry   │   │
//!                 │  │ error → JSON │          │ exists / load / call │   │
//!                 │  └──────────────┘          └──────────────────────┘   │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::{self, GatewayConfig};
use edge_gateway::observability::{logging, metrics};
use edge_gateway::{FunctionRegistry, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Authenticating gateway for edge functions", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    let config = config::apply_env(base, |key| std::env::var(key).ok());

    logging::init_logging(&config.observability.log_level);
    tracing::info!("edge-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match config::finalize(config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    let registry = FunctionRegistry::builtin();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        require_auth = config.auth.require_auth,
        function_timeout_secs = config.timeouts.function_secs,
        functions = ?registry.list_available(),
        disabled = ?config.functions.disabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, registry);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
