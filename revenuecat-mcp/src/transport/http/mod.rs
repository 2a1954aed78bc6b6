//! HTTP client for the RevenueCat REST API.
//!
//! Builds on reqwest with connection pooling. Every call is authenticated
//! with the configured secret key and retried per the configured
//! [`RetryPolicy`].

use std::{fmt, time::Instant};

use reqwest::{Client, header::CONTENT_TYPE};
use serde_json::Value;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use super::HttpMethod;
use crate::{
    config::{Config, HttpConfig, HttpVersion, SecretKey},
    error::{Result, RevenueCatError},
    reliability::{RetryPolicy, retry_with_backoff},
};

/// Correlation header sent with every attempt.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Rejects paths that could escape the API base.
///
/// Segments are expected to be percent-encoded already, so only whole `.`
/// and `..` segments count as traversal.
fn sanitize_path(path: &str) -> Result<&str> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(RevenueCatError::InvalidInput("Path must start with '/'".to_owned()));
    };
    if rest.split('/').any(|segment| matches!(segment, "" | "." | "..")) {
        return Err(RevenueCatError::InvalidInput(
            "Invalid path: empty or dot segments not allowed".to_owned(),
        ));
    }
    if path.contains(['?', '#']) || path.chars().any(char::is_control) {
        return Err(RevenueCatError::InvalidInput(
            "Invalid path: reserved or control characters not allowed".to_owned(),
        ));
    }
    Ok(path)
}

/// Decodes a success body; an empty body is `null`.
fn decode_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
        .map_err(|e| RevenueCatError::InvalidResponse(format!("body is not valid JSON: {e}")))
}

fn build_client(config: &HttpConfig) -> Result<Client> {
    let builder = Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout());

    let builder = match config.http_version {
        HttpVersion::Http1 => builder.http1_only(),
        HttpVersion::Http2 => builder.http2_prior_knowledge(),
        HttpVersion::Auto => builder,
    };

    builder.build().map_err(RevenueCatError::Http)
}

/// Authenticated, retrying RevenueCat API client.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Examples
///
/// ```rust,no_run
/// use revenuecat_mcp::{
///     Config,
///     transport::{HttpMethod, RevenueCatClient},
/// };
/// use serde_json::json;
///
/// # async fn example() -> revenuecat_mcp::Result<()> {
/// let config = Config::from_toml("secret_key = \"sk_test\"")?;
/// let client = RevenueCatClient::new(&config)?;
///
/// let body = json!({ "lookup_key": "premium", "display_name": "Premium" });
/// let created = client.send(HttpMethod::Post, "/entitlements", Some(&body), None).await?;
/// println!("{created}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RevenueCatClient {
    client: Client,
    base_url: String,
    secret_key: SecretKey,
    retry: RetryPolicy,
}

impl fmt::Debug for RevenueCatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevenueCatClient")
            .field("base_url", &self.base_url)
            .field("secret_key", &self.secret_key)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl RevenueCatClient {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueCatError::Config`] if the configuration is invalid,
    /// or [`RevenueCatError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(&config.http)?,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            secret_key: config.secret_key.clone(),
            retry: config.retry_policy(),
        })
    }

    /// Base URL every path is appended to, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry policy applied to each call.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Sends one logical request and returns the decoded JSON body.
    ///
    /// A single correlation id is generated per call and reused across
    /// retries. Server errors and network failures are retried; other
    /// failures are returned immediately.
    ///
    /// # Errors
    ///
    /// - [`RevenueCatError::InvalidInput`] for an unsafe path
    /// - [`RevenueCatError::Status`] for a non-success response
    /// - [`RevenueCatError::Network`] if no response was received
    /// - [`RevenueCatError::InvalidResponse`] for a non-JSON success body
    #[instrument(skip(self, method, body, query), fields(method = %method))]
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        query: Option<&[(String, String)]>,
    ) -> Result<Value> {
        let url = self.build_url(sanitize_path(path)?, query)?;
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| RevenueCatError::InvalidInput(format!("unserializable body: {e}")))?;
        let request_id = Uuid::new_v4();

        let url = &url;
        let payload = payload.as_deref();
        retry_with_backoff(&self.retry, move |attempt| {
            self.attempt(method, url, payload, request_id, attempt)
        })
        .await
    }

    fn build_url(&self, path: &str, query: Option<&[(String, String)]>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| RevenueCatError::InvalidInput(format!("invalid request URL: {e}")))?;

        if let Some(pairs) = query
            && !pairs.is_empty()
        {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    async fn attempt(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&[u8]>,
        request_id: Uuid,
        attempt: u32,
    ) -> Result<Value> {
        tracing::info!(
            %request_id,
            method = method.as_str(),
            url = %url,
            attempt,
            "HTTP request started"
        );
        let started = Instant::now();

        let mut request = self
            .client
            .request(method.to_reqwest(), url.clone())
            .bearer_auth(self.secret_key.expose())
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        let response = request.send().await.map_err(|source| {
            tracing::warn!(%request_id, attempt, error = %source, "HTTP request failed");
            RevenueCatError::Network { request_id, source }
        })?;

        let status = response.status().as_u16();
        let success = response.status().is_success();
        let text = response
            .text()
            .await
            .map_err(|source| RevenueCatError::Network { request_id, source })?;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !success {
            tracing::warn!(%request_id, attempt, status, elapsed_ms, "HTTP request failed");
            return Err(RevenueCatError::Status { status, body: text, request_id });
        }

        tracing::info!(%request_id, attempt, status, elapsed_ms, "HTTP request completed");
        decode_body(&text)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::config::RetryConfig;

    fn config_for(base_url: &str) -> Config {
        Config {
            api_url: base_url.to_owned(),
            secret_key: SecretKey::new("sk_test_123"),
            retry: RetryConfig { max_attempts: 3, base_delay_ms: 1, max_delay_ms: 5, jitter: false },
            ..Config::default()
        }
    }

    #[test]
    fn test_client_requires_secret_key() {
        let config = Config { secret_key: SecretKey::default(), ..config_for("https://x.test") };
        assert!(matches!(RevenueCatClient::new(&config), Err(RevenueCatError::Config(_))));
    }

    #[test]
    fn test_client_with_http_versions() {
        for http_version in [HttpVersion::Http1, HttpVersion::Http2, HttpVersion::Auto] {
            let mut config = config_for("https://api.revenuecat.com/v2");
            config.http.http_version = http_version;
            assert!(RevenueCatClient::new(&config).is_ok());
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let client = RevenueCatClient::new(&config_for("https://api.revenuecat.com/v2")).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk_test_123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let client = RevenueCatClient::new(&config_for("https://api.revenuecat.com/v2/")).unwrap();
        assert_eq!(client.base_url(), "https://api.revenuecat.com/v2");

        let url = client.build_url("/entitlements", None).unwrap();
        assert_eq!(url.as_str(), "https://api.revenuecat.com/v2/entitlements");
    }

    #[test]
    fn test_build_url_encodes_query() {
        let client = RevenueCatClient::new(&config_for("https://api.revenuecat.com/v2")).unwrap();
        let query = vec![("cursor".to_owned(), "a b&c".to_owned())];

        let url = client.build_url("/packages", Some(query.as_slice())).unwrap();
        assert_eq!(url.as_str(), "https://api.revenuecat.com/v2/packages?cursor=a+b%26c");

        let url = client.build_url("/packages", Some(Vec::new().as_slice())).unwrap();
        assert!(url.query().is_none());
    }

    #[test]
    fn test_sanitize_path_valid() {
        assert!(sanitize_path("/entitlements").is_ok());
        assert!(sanitize_path("/projects/proj1/offerings/ofrng1").is_ok());
        assert!(sanitize_path("/entitlements/v1..2").is_ok());
        assert!(sanitize_path("/entitlements/50%25off").is_ok());
    }

    #[test]
    fn test_sanitize_path_rejects_unsafe() {
        let unsafe_paths =
            ["/../admin", "/a/./b", "/a//b", "/a/", "entitlements", "", "/a?b=1", "/a#f", "/a\nb"];
        for path in unsafe_paths {
            assert!(
                matches!(sanitize_path(path), Err(RevenueCatError::InvalidInput(_))),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body("").unwrap(), Value::Null);
        assert_eq!(decode_body("  \n").unwrap(), Value::Null);
        assert_eq!(decode_body("{\"id\":\"e1\"}").unwrap(), json!({ "id": "e1" }));
        assert!(matches!(decode_body("<html>"), Err(RevenueCatError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_send_sets_headers_and_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/entitlements")
                    .header("authorization", "Bearer sk_test_123")
                    .header("content-type", "application/json")
                    .header_exists("x-request-id")
                    .json_body(json!({ "lookup_key": "premium", "display_name": "Premium" }));
                then.status(201).json_body(json!({ "id": "entla1" }));
            })
            .await;

        let client = RevenueCatClient::new(&config_for(&server.base_url())).unwrap();
        let body = json!({ "lookup_key": "premium", "display_name": "Premium" });
        let result = client.send(HttpMethod::Post, "/entitlements", Some(&body), None).await;

        assert_eq!(result.unwrap(), json!({ "id": "entla1" }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_client_error_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/packages/missing");
                then.status(404).body("{\"type\":\"resource_missing\"}");
            })
            .await;

        let client = RevenueCatClient::new(&config_for(&server.base_url())).unwrap();
        let err = client.send(HttpMethod::Delete, "/packages/missing", None, None).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.request_id().is_some());
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_send_server_error_exhausts_retries() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/entitlements");
                then.status(503);
            })
            .await;

        let client = RevenueCatClient::new(&config_for(&server.base_url())).unwrap();
        let err = client.send(HttpMethod::Get, "/entitlements", None, None).await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        mock.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_send_empty_success_body_is_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/entitlements/entla1");
                then.status(204);
            })
            .await;

        let client = RevenueCatClient::new(&config_for(&server.base_url())).unwrap();
        let result = client.send(HttpMethod::Delete, "/entitlements/entla1", None, None).await;
        assert_eq!(result.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_send_non_json_success_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/entitlements");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let client = RevenueCatClient::new(&config_for(&server.base_url())).unwrap();
        let result = client.send(HttpMethod::Get, "/entitlements", None, None).await;

        assert!(matches!(result, Err(RevenueCatError::InvalidResponse(_))));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_send_connection_refused_is_network_error() {
        // Bind then drop to obtain a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RevenueCatClient::new(&config_for(&format!("http://{addr}"))).unwrap();
        let result = client.send(HttpMethod::Get, "/entitlements", None, None).await;

        assert!(matches!(result, Err(RevenueCatError::Network { .. })));
    }

    #[tokio::test]
    async fn test_send_rejects_unsafe_path_before_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200);
            })
            .await;

        let client = RevenueCatClient::new(&config_for(&server.base_url())).unwrap();
        let result = client.send(HttpMethod::Get, "/../secrets", None, None).await;

        assert!(matches!(result, Err(RevenueCatError::InvalidInput(_))));
        mock.assert_hits_async(0).await;
    }
}
