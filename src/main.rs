//! Brave Search MCP server - main entry point

use brave_search_mcp::config::ServerConfig;
use brave_search_mcp::gateway::{GatewayServer, McpHandler, ServerInfo};
use brave_search_mcp::observability::{health::HealthService, init_default_logging, metrics::metrics};
use brave_search_mcp::search::{
    BraveClient, BraveClientConfig, RateLimiter, SearchOrchestrator,
};
use brave_search_mcp::tools::ToolSystem;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// MCP server exposing Brave web and local search
#[derive(Parser)]
#[command(name = "brave-search-mcp")]
#[command(about = "MCP server exposing Brave web and local search over SSE")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen port (overrides the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over SSE (default)
    Serve,
    /// Validate configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    // A missing .env file is not an error.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_default_logging();

    let config = match ServerConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_port_override(cli.port),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = match config.get_api_key() {
        Ok(key) => key,
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    };

    info!(
        name = %config.server.name,
        version = %config.server.version,
        "Starting Brave Search MCP server v{}",
        env!("CARGO_PKG_VERSION")
    );
    metrics().set_server_state("initializing");

    let server = build_server(&config, api_key)?;
    let addr = config.socket_addr()?;

    server.run(addr, shutdown_signal()).await?;

    info!("Application shutdown complete");
    Ok(())
}

/// Bootstrap: limiter -> client -> orchestrator -> tools -> gateway
fn build_server(
    config: &ServerConfig,
    api_key: String,
) -> Result<GatewayServer, Box<dyn std::error::Error>> {
    let limiter = Arc::new(RateLimiter::new(config.rate_limit));

    let client = BraveClient::new(
        BraveClientConfig {
            api_key,
            base_url: config.base_url()?,
            timeout: config.request_timeout(),
        },
        limiter.clone(),
    )?;

    let orchestrator = SearchOrchestrator::new(Arc::new(client));
    let tools = Arc::new(ToolSystem::with_search(orchestrator));

    let handler = McpHandler::new(
        tools,
        ServerInfo {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
        },
    );
    let health = HealthService::new(
        config.server.name.clone(),
        config.server.version.clone(),
        limiter,
    );

    Ok(GatewayServer::new(handler, health))
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down gracefully..."),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
    metrics().set_server_state("stopping");
}

fn handle_config_command(
    config: &ServerConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("{}", config.to_toml()?);
    }

    info!("Configuration validation complete");
    Ok(())
}
