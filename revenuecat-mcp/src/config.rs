//! Runtime configuration.
//!
//! Configuration is loaded once at startup and is immutable afterwards. It
//! can come from a TOML file, from environment variables, or from both, in
//! which case environment variables override file values.
//!
//! # Environment variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `REVENUECAT_SECRET_KEY` | `secret_key` (required) |
//! | `RC_API_URL` | `api_url` |
//! | `LOG_LEVEL` | `log_level` |
//! | `RC_MAX_ATTEMPTS` | `retry.max_attempts` |
//! | `RC_RETRY_BASE_MS` | `retry.base_delay_ms` |
//! | `RC_RETRY_MAX_MS` | `retry.max_delay_ms` |
//! | `RC_TIMEOUT_SECS` | `http.timeout_secs` |
//! | `REVENUECAT_CONFIG` | path of a TOML file read by [`Config::load`] |
//!
//! # Examples
//!
//! ```
//! use revenuecat_mcp::Config;
//!
//! let config = Config::from_toml(
//!     r#"
//!     secret_key = "sk_test"
//!
//!     [retry]
//!     max_attempts = 5
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.api_url, "https://api.revenuecat.com/v2");
//! assert_eq!(config.retry.max_attempts, 5);
//! ```

use std::{fmt, ops::RangeInclusive, str::FromStr, time::Duration};

use serde::{Deserialize, Deserializer};
use url::Url;
use zeroize::Zeroizing;

use crate::{
    error::{Result, RevenueCatError},
    reliability::RetryPolicy,
};

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "REVENUECAT_CONFIG";

/// RevenueCat secret API key.
///
/// The key is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretKey(Zeroizing<String>);

impl SecretKey {
    /// Wraps a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    /// Returns the raw key for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no key was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the RevenueCat REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Secret API key sent as a bearer token.
    #[serde(default)]
    pub secret_key: SecretKey,

    /// Fallback log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retry behaviour for upstream calls.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Connection settings for the API client.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            secret_key: SecretKey::default(),
            log_level: default_log_level(),
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Retry settings, converted into a [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failure, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for a single delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Randomize each delay within `[0, computed]`.
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Validates retry bounds.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueCatError::Config`] if `max_attempts` is zero or the
    /// base delay exceeds the maximum delay.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(RevenueCatError::Config(
                "retry.max_attempts must be at least 1".to_owned(),
            ));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(RevenueCatError::Config(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".to_owned(),
            ));
        }
        Ok(())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: 2.0,
            jitter: config.jitter,
        }
    }
}

const TIMEOUT_SECS: RangeInclusive<u64> = 1..=300;
const CONNECT_TIMEOUT_SECS: RangeInclusive<u64> = 1..=60;

/// Connection settings for the RevenueCat API client, the `[http]` table.
///
/// ```toml
/// [http]
/// timeout_secs = 30
/// connect_timeout_secs = 10
/// pool_max_idle_per_host = 10
/// http_version = "auto"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Deadline for one attempt against the API, in seconds (1 to 300).
    pub timeout_secs: u64,

    /// Deadline for establishing a connection, in seconds (1 to 60).
    pub connect_timeout_secs: u64,

    /// Idle keep-alive connections held to the API host.
    pub pool_max_idle_per_host: usize,

    /// Protocol spoken to the API host.
    pub http_version: HttpVersion,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 10,
            http_version: HttpVersion::Auto,
        }
    }
}

impl HttpConfig {
    /// Checks both deadlines against their ranges, and that connecting may
    /// not outlast the attempt it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueCatError::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        in_range("http.timeout_secs", self.timeout_secs, &TIMEOUT_SECS)?;
        in_range("http.connect_timeout_secs", self.connect_timeout_secs, &CONNECT_TIMEOUT_SECS)?;
        if self.connect_timeout_secs > self.timeout_secs {
            return Err(RevenueCatError::Config(
                "http.connect_timeout_secs must not exceed http.timeout_secs".to_owned(),
            ));
        }
        Ok(())
    }

    /// Per-attempt deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect deadline.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Protocol spoken to the API host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVersion {
    /// Always HTTP/1.1.
    Http1,
    /// HTTP/2 without upgrade negotiation.
    Http2,
    /// Whatever TLS ALPN settles on.
    #[default]
    Auto,
}

impl Config {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueCatError::Config`] if the document is malformed or
    /// any value fails validation.
    pub fn from_toml(document: &str) -> Result<Self> {
        let config = parse_toml(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueCatError::Config`] if `REVENUECAT_SECRET_KEY` is
    /// missing or any variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from defaults overridden by `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the TOML file named by `REVENUECAT_CONFIG` if set, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueCatError::Config`] if the file cannot be read or
    /// parsed, or if the merged configuration is invalid.
    pub fn load() -> Result<Self> {
        let Some(path) = std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()) else {
            return Self::from_env();
        };

        let document = std::fs::read_to_string(&path)
            .map_err(|e| RevenueCatError::Config(format!("failed to read {path}: {e}")))?;
        let mut config = parse_toml(&document)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        tracing::debug!(path = %path, "Loaded configuration file");
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueCatError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(RevenueCatError::Config("REVENUECAT_SECRET_KEY must be set".to_owned()));
        }

        let url = Url::parse(&self.api_url).map_err(|e| {
            RevenueCatError::Config(format!("invalid api_url '{}': {e}", self.api_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RevenueCatError::Config(format!(
                "api_url must use http or https, got: {}",
                url.scheme()
            )));
        }

        self.retry.validate()?;
        self.http.validate()
    }

    /// Retry policy derived from the `[retry]` section.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup("REVENUECAT_SECRET_KEY") {
            self.secret_key = SecretKey::new(key);
        }
        if let Some(url) = lookup("RC_API_URL") {
            self.api_url = url;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(value) = lookup("RC_MAX_ATTEMPTS") {
            self.retry.max_attempts = parse_number("RC_MAX_ATTEMPTS", &value)?;
        }
        if let Some(value) = lookup("RC_RETRY_BASE_MS") {
            self.retry.base_delay_ms = parse_number("RC_RETRY_BASE_MS", &value)?;
        }
        if let Some(value) = lookup("RC_RETRY_MAX_MS") {
            self.retry.max_delay_ms = parse_number("RC_RETRY_MAX_MS", &value)?;
        }
        if let Some(value) = lookup("RC_TIMEOUT_SECS") {
            self.http.timeout_secs = parse_number("RC_TIMEOUT_SECS", &value)?;
        }
        Ok(())
    }
}

fn parse_toml(document: &str) -> Result<Config> {
    toml::from_str(document)
        .map_err(|e| RevenueCatError::Config(format!("invalid configuration file: {e}")))
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RevenueCatError::Config(format!("{name} must be a non-negative integer")))
}

fn in_range(key: &str, value: u64, range: &RangeInclusive<u64>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(RevenueCatError::Config(format!(
        "{key} must be between {} and {}, got {value}",
        range.start(),
        range.end()
    )))
}

fn default_api_url() -> String {
    "https://api.revenuecat.com/v2".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    200
}

const fn default_max_delay_ms() -> u64 {
    2000
}
