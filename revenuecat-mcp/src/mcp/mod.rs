//! Model Context Protocol (MCP) integration.
//!
//! This module exposes the RevenueCat catalog (entitlements, offerings,
//! products, packages and price experiments) as MCP tools.
//!
//! # Architecture
//!
//! ```text
//! AI Agent
//!     │
//!     │ MCP Protocol (JSON-RPC 2.0)
//!     ▼
//! ToolDispatcher (this module)
//!     │
//!     │ validate → sanitize → route
//!     ▼
//! RevenueCatClient (transport module)
//!     │
//!     │ bearer auth, retry with backoff
//!     ▼
//! RevenueCat REST API (HTTPS)
//! ```
//!
//! Failures at any stage are reported as an [`McpError`] carrying a
//! JSON-RPC error code.

pub mod dispatcher;
pub mod error;
pub mod routes;
pub mod tools;

pub use dispatcher::ToolDispatcher;
pub use error::{ErrorKind, McpError, map_error};
pub use routes::{RequestPlan, route};
pub use tools::{ToolDescriptor, ToolName, UnknownTool, tool_descriptors};
