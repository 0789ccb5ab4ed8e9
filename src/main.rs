//! BGS Sensor MCP Server
//!
//! Serves the sensor tools over SSE/HTTP (default) or stdio.

use std::time::Duration;

use anyhow::Context;
use bgs_sensor_mcp::config::{ServerConfig, ServiceConfig, DEFAULT_BASE_URL, DEFAULT_PORT};
use bgs_sensor_mcp::cors::CorsPolicy;
use bgs_sensor_mcp::handlers::{self, AppState};
use bgs_sensor_mcp::{McpServer, SensorService, ToolSurface};
use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// How MCP messages reach the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// HTTP: `GET /sse` + `POST /messages`, plus `POST /mcp`
    Sse,
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
}

/// MCP server for the British Geological Survey sensor API
#[derive(Parser, Debug)]
#[command(name = "bgs-sensor-mcp")]
#[command(version)]
#[command(about = "MCP server for the BGS FROST SensorThings API")]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// SensorThings base URL
    #[arg(long, env = "BGS_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// User-Agent sent upstream (default: bgs-sensor-mcp/<version>)
    #[arg(long, env = "BGS_USER_AGENT")]
    user_agent: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "BGS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Transport to serve
    #[arg(long, value_enum, default_value_t = Transport::Sse)]
    transport: Transport,

    /// Tool set to advertise
    #[arg(long, value_enum, default_value_t = ToolSurface::Full)]
    surface: ToolSurface,

    /// Allowed CORS origins for the HTTP transport
    #[arg(long, value_enum, default_value_t = CorsPolicy::Localhost)]
    cors: CorsPolicy,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::new(&self.base_url);
        if let Some(ua) = &self.user_agent {
            config = config.with_user_agent(ua);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the protocol in stdio mode, so logs always go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let service_config = args.service_config();
    tracing::info!(
        base_url = %service_config.base_url,
        surface = ?args.surface,
        "BGS Sensor MCP server v{} starting",
        bgs_sensor_mcp::VERSION
    );

    let upstream = service_config.base_url.clone();
    let service =
        SensorService::from_config(service_config).context("invalid upstream configuration")?;
    let server = McpServer::new(service, args.surface);

    match args.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Sse => {
            let addr = args.server_config().listen_addr();
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            handlers::serve(listener, AppState::new(server, upstream), args.cors).await?;
        }
    }

    Ok(())
}
