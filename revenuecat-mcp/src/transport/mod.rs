//! Resilient HTTP transport for the RevenueCat REST API.
//!
//! [`RevenueCatClient`] owns a pooled `reqwest` client, the base URL and the
//! secret key. Every logical call gets one correlation id, is retried with
//! exponential backoff on transient failures, and yields the decoded JSON
//! body or a classified [`RevenueCatError`](crate::RevenueCatError).
//!
//! # Examples
//!
//! ```rust,no_run
//! use revenuecat_mcp::{
//!     Config,
//!     transport::{HttpMethod, RevenueCatClient},
//! };
//!
//! # async fn example() -> revenuecat_mcp::Result<()> {
//! let config = Config::from_env()?;
//! let client = RevenueCatClient::new(&config)?;
//!
//! let entitlements = client.send(HttpMethod::Get, "/entitlements", None, None).await?;
//! println!("{entitlements}");
//! # Ok(())
//! # }
//! ```

use std::fmt;

pub mod http;

pub use http::RevenueCatClient;

/// HTTP methods used by the RevenueCat API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
