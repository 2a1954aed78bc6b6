//! RevenueCat MCP Server - exposes the RevenueCat API as MCP tools over stdio
//!
//! Speaks MCP over stdin/stdout via `rmcp`. Logs go to stderr.
//!
//! # Configuration
//!
//! - `REVENUECAT_SECRET_KEY`: RevenueCat secret API key (required)
//! - `REVENUECAT_CONFIG`: optional TOML configuration file
//! - `RC_API_URL`, `LOG_LEVEL`, `RC_MAX_ATTEMPTS`, `RC_RETRY_BASE_MS`,
//!   `RC_RETRY_MAX_MS`, `RC_TIMEOUT_SECS`: overrides
//! - `LOG_FORMAT`: `json` or `pretty`
//! - `RUST_LOG`: log filter, takes precedence over `LOG_LEVEL`

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from rmcp and reqwest"
)]

mod observability;
mod server;

use std::process::ExitCode;

use revenuecat_mcp::{Config, ToolDispatcher, mcp::ToolName};
use rmcp::{ServiceExt, transport::stdio};

use crate::{
    observability::{LogFormat, init_observability},
    server::McpServer,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("revenuecat-mcp-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_observability(LogFormat::from_env(), &config.log_level) {
        eprintln!("revenuecat-mcp-server: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let dispatcher = match ToolDispatcher::new(&config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create RevenueCat client");
            eprintln!("revenuecat-mcp-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        api_url = %config.api_url,
        tools = ToolName::ALL.len(),
        max_attempts = config.retry.max_attempts,
        "RevenueCat MCP server starting"
    );

    let service = match McpServer::new(dispatcher).serve(stdio()).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "MCP handshake failed");
            return ExitCode::FAILURE;
        }
    };

    match service.waiting().await {
        Ok(reason) => {
            tracing::info!(?reason, "Input closed, shutting down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server task failed");
            ExitCode::FAILURE
        }
    }
}
