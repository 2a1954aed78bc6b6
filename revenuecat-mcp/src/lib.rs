//! RevenueCat MCP Bridge: validated, resilient access to the RevenueCat API
//!
//! A Rust library that exposes the RevenueCat REST API (v2) as Model Context
//! Protocol tools, so AI agents can manage entitlements, offerings,
//! products, packages and price experiments.
//!
//! # What does the bridge guarantee?
//!
//! - **Closed-world validation**: every tool call is checked against a
//!   per-tool schema before anything is sent; undeclared fields are removed
//! - **Resilient transport**: transient failures (5xx, network errors) are
//!   retried with capped exponential backoff; client errors are not
//! - **Correlation**: one request id per logical call, sent as `X-Request-ID`
//!   and attached to every error
//! - **Stable error taxonomy**: upstream failures map onto a closed set of
//!   MCP error kinds with JSON-RPC codes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   AI Agent      │  MCP-compatible client
//! └────────┬────────┘
//!          │ MCP Protocol (JSON-RPC 2.0 over stdio)
//!          │
//! ┌────────▼────────────────────────────────────────┐
//! │         RevenueCat MCP Bridge (this crate)      │
//! │  ┌──────────────┐      ┌──────────────────┐     │
//! │  │  Validator   │──────│  Tool routing    │     │
//! │  │  (schemas)   │      │  (REST paths)    │     │
//! │  └──────────────┘      └────────┬─────────┘     │
//! │                        ┌────────▼─────────┐     │
//! │                        │ RevenueCatClient │     │
//! │                        │ (retry, backoff) │     │
//! │                        └──────────────────┘     │
//! └────────┬────────────────────────────────────────┘
//!          │ HTTPS + Bearer secret key
//!          │
//! ┌────────▼────────┐
//! │  RevenueCat v2  │
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use revenuecat_mcp::{Config, mcp::ToolDispatcher};
//! use serde_json::json;
//!
//! # async fn example() -> revenuecat_mcp::Result<()> {
//! // Reads REVENUECAT_SECRET_KEY and optional overrides
//! let config = Config::from_env()?;
//! let dispatcher = ToolDispatcher::new(&config)?;
//!
//! let args = json!({ "identifier": "premium", "name": "Premium" });
//! match dispatcher.call("CreateEntitlement", &args).await {
//!     Ok(entitlement) => println!("created: {entitlement}"),
//!     Err(err) => eprintln!("{}: {}", err.code(), err.message),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`validation`]: per-tool schemas and the argument validator
//! - [`mcp`]: tool catalog, routing, dispatching and MCP error mapping
//! - [`transport`]: authenticated HTTP client
//! - [`reliability`]: retry with exponential backoff
//! - [`config`]: TOML and environment configuration
//! - [`error`]: library error type
//!
//! # Security Considerations
//!
//! - The secret key is held in zeroizing memory and redacted from `Debug`
//! - Tool arguments are never logged
//! - Identifiers placed in URL paths are checked for traversal and reserved
//!   characters
//! - Upstream response bodies are forwarded to clients only for `400`
//!   responses

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions, reason = "transitive dependencies from reqwest")]

pub mod config;
pub mod error;
pub mod mcp;
pub mod reliability;
pub mod transport;
pub mod validation;

pub use config::Config;
pub use error::{Result, RevenueCatError};
pub use mcp::{McpError, ToolDispatcher};
