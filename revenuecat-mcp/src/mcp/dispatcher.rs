//! Tool call pipeline: validate, route, send, map errors.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::{McpError, RequestPlan, ToolDescriptor, ToolName, map_error, route, tool_descriptors};
use crate::{
    config::Config,
    error::Result,
    transport::RevenueCatClient,
    validation::Validator,
};

/// Executes MCP tool calls against the RevenueCat API.
///
/// Cheap to clone; clones share the schema registry and connection pool, so
/// one dispatcher can serve concurrent calls.
///
/// # Examples
///
/// ```rust,no_run
/// use revenuecat_mcp::{Config, mcp::ToolDispatcher};
/// use serde_json::json;
///
/// # async fn example() -> revenuecat_mcp::Result<()> {
/// let dispatcher = ToolDispatcher::new(&Config::from_env()?)?;
///
/// match dispatcher.call("GetEntitlement", &json!({ "id": "entla1" })).await {
///     Ok(entitlement) => println!("{entitlement}"),
///     Err(err) => eprintln!("{} ({})", err.message, err.code()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    validator: Arc<Validator>,
    client: RevenueCatClient,
}

impl ToolDispatcher {
    /// Creates a dispatcher with a client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(RevenueCatClient::new(config)?))
    }

    /// Creates a dispatcher around an existing client.
    #[must_use]
    pub fn with_client(client: RevenueCatClient) -> Self {
        Self { validator: Arc::new(Validator::new()), client }
    }

    /// Descriptors for `tools/list`.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        tool_descriptors(self.validator.registry())
    }

    /// Runs one tool call.
    ///
    /// `args` must be a JSON object; `null` or a missing argument object is
    /// rejected like any other non-object. Arguments are validated before
    /// anything is sent, undeclared fields never reach the API, and they are
    /// not logged.
    ///
    /// # Errors
    ///
    /// Returns the [`McpError`] for an unknown tool, rejected arguments, or
    /// a failed upstream call.
    #[instrument(skip(self, args))]
    pub async fn call(&self, name: &str, args: &Value) -> std::result::Result<Value, McpError> {
        tracing::info!(tool = name, "Tool called");

        let result = self.execute(name, args).await;

        if let Err(err) = &result {
            tracing::error!(
                tool = name,
                kind = err.kind.as_str(),
                code = err.code(),
                "Tool execution failed"
            );
        }
        result
    }

    async fn execute(&self, name: &str, args: &Value) -> std::result::Result<Value, McpError> {
        let (tool, sanitized) = self.validator.validate_call_or_mcp_error(name, args)?;

        let RequestPlan { method, path, body, query } =
            route(tool, sanitized).map_err(|e| map_error(&e))?;

        self.client
            .send(method, &path, body.as_ref(), Some(query.as_slice()))
            .await
            .map_err(|e| map_error(&e))
    }
}
