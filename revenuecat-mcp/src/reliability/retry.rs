//! Exponential backoff retry logic for transient failures.
//!
//! This module provides retry functionality with exponential backoff for
//! handling transient network errors and temporary API unavailability.

use std::time::Duration;

use rand::Rng;

use crate::error::{Result, RevenueCatError};

/// Configuration for retry behavior.
///
/// The delay after failed attempt `n` (1-based) is
/// `initial_delay * backoff_multiplier^(n-1)`, capped at `max_delay`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use revenuecat_mcp::reliability::RetryPolicy;
///
/// // Default policy: 3 attempts, 200ms initial delay, 2s max delay
/// let policy = RetryPolicy::default();
///
/// // Custom policy: more aggressive retries
/// let aggressive = RetryPolicy {
///     max_attempts: 5,
///     initial_delay: Duration::from_millis(50),
///     max_delay: Duration::from_secs(10),
///     backoff_multiplier: 2.0,
///     jitter: false,
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first (default: 3)
    pub max_attempts: u32,
    /// Delay after the first failed attempt (default: 200ms)
    pub initial_delay: Duration,
    /// Upper bound for any single delay (default: 2s)
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (default: 2.0)
    pub backoff_multiplier: f64,
    /// Draw each delay uniformly from `[0, computed]` (default: false)
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use revenuecat_mcp::reliability::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new();
    /// assert_eq!(policy.max_attempts, 3);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy with custom maximum attempts.
    ///
    /// # Examples
    ///
    /// ```
    /// use revenuecat_mcp::reliability::RetryPolicy;
    ///
    /// let policy = RetryPolicy::with_max_attempts(5);
    /// assert_eq!(policy.max_attempts, 5);
    /// ```
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts, ..Self::default() }
    }

    /// Calculates the delay that follows failed attempt number `attempt` (1-based).
    ///
    /// Capped at `max_delay` to prevent excessive waits. Ignores `jitter`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        #[allow(clippy::cast_precision_loss, reason = "acceptable for duration calculations")]
        let delay_ms = (self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(exponent))
        .min(self.max_delay.as_millis() as f64);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "delay_ms is non-negative and bounded by max_delay"
        )]
        let delay = Duration::from_millis(delay_ms.max(0.0) as u64);
        delay.min(self.max_delay)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let delay = self.delay_for_attempt(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let upper = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(0..=upper))
    }
}

/// Executes `operation` with exponential backoff retry.
///
/// The closure receives the 1-based attempt number. Errors that
/// [`is_retryable`] rejects are returned immediately; retryable errors are
/// retried until `max_attempts` is reached, after which the last error is
/// returned. Attempts are strictly sequential.
///
/// # Examples
///
/// ```
/// use revenuecat_mcp::{
///     RevenueCatError,
///     reliability::{RetryPolicy, retry_with_backoff},
/// };
/// use uuid::Uuid;
///
/// # async fn example() -> revenuecat_mcp::Result<()> {
/// let policy = RetryPolicy::default();
///
/// let result = retry_with_backoff(&policy, |attempt| async move {
///     if attempt < 3 {
///         Err(RevenueCatError::Status {
///             status: 503,
///             body: String::new(),
///             request_id: Uuid::nil(),
///         })
///     } else {
///         Ok("success")
///     }
/// })
/// .await?;
///
/// assert_eq!(result, "success");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the first non-retryable error, the last error once attempts are
/// exhausted, or [`RevenueCatError::RetriesExhausted`] when the policy allows
/// no attempts at all.
pub async fn retry_with_backoff<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 1..=policy.max_attempts {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                if !is_retryable(&error) {
                    tracing::debug!(attempt, error = %error, "Operation failed, not retryable");
                    return Err(error);
                }

                if attempt == policy.max_attempts {
                    tracing::warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %error,
                        "Operation failed, retries exhausted"
                    );
                    return Err(error);
                }

                let delay = policy.backoff(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(RevenueCatError::RetriesExhausted { attempts: policy.max_attempts })
}

/// Determines if an error is retryable.
///
/// Returns `true` for transient failures that might succeed on retry:
///
/// - upstream server errors (5xx status codes)
/// - network failures: connection refused or reset, DNS resolution,
///   timeouts, and errors while sending the request or reading the body
///
/// Returns `false` for everything else, including every 4xx status.
///
/// # Examples
///
/// ```
/// use revenuecat_mcp::{RevenueCatError, reliability::is_retryable};
/// use uuid::Uuid;
///
/// let not_found = RevenueCatError::Status { status: 404, body: String::new(), request_id: Uuid::nil() };
/// assert!(!is_retryable(&not_found));
///
/// let unavailable = RevenueCatError::Status { status: 503, body: String::new(), request_id: Uuid::nil() };
/// assert!(is_retryable(&unavailable));
/// ```
#[must_use]
pub fn is_retryable(error: &RevenueCatError) -> bool {
    match error {
        RevenueCatError::Status { status, .. } => (500..=599).contains(status),
        RevenueCatError::Network { source, .. } | RevenueCatError::Http(source) => {
            is_network_failure(source)
        }
        RevenueCatError::InvalidResponse(_)
        | RevenueCatError::Validation(_)
        | RevenueCatError::InvalidInput(_)
        | RevenueCatError::Config(_)
        | RevenueCatError::RetriesExhausted { .. } => false,
    }
}

fn is_network_failure(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request() || error.is_body()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    };

    use tokio::time::Instant;
    use uuid::Uuid;

    use super::*;

    fn status(status: u16) -> RevenueCatError {
        RevenueCatError::Status { status, body: String::new(), request_id: Uuid::nil() }
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
        assert!((policy.backoff_multiplier - 2.0).abs() < f64::EPSILON);
        assert!(!policy.jitter);
    }

    #[test]
    fn test_retry_policy_with_max_attempts() {
        let policy = RetryPolicy::with_max_attempts(5);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_delay_for_attempt() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(1600));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(2));
    }

    #[test]
    fn test_delay_for_attempt_large_values() {
        let policy = RetryPolicy { max_attempts: 100, ..RetryPolicy::default() };
        assert_eq!(policy.delay_for_attempt(100), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(2));
    }

    #[test]
    fn test_jitter_stays_within_computed_delay() {
        let policy = RetryPolicy { jitter: true, ..RetryPolicy::default() };
        for attempt in 1..=6 {
            let bound = policy.delay_for_attempt(attempt);
            for _ in 0..20 {
                assert!(policy.backoff(attempt) <= bound);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_two_server_errors() {
        let policy = RetryPolicy::default();
        let starts = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&starts);
        let result = retry_with_backoff(&policy, |attempt| {
            let recorded = Arc::clone(&recorded);
            async move {
                recorded.lock().unwrap().push(Instant::now());
                if attempt < 3 { Err(status(500)) } else { Ok(42) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);
        let first_gap = starts[1] - starts[0];
        let second_gap = starts[2] - starts[1];
        assert_eq!(first_gap, Duration::from_millis(200));
        assert_eq!(second_gap, Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_not_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(&policy, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Err(status(404)) }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_attempts_fail_returns_last_error() {
        let policy = RetryPolicy::with_max_attempts(3);
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(&policy, |attempt| {
            calls.fetch_add(1, Ordering::Relaxed);
            let code = if attempt == 3 { 503 } else { 500 };
            async move { Err(status(code)) }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(503));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_reports_exhaustion() {
        let policy = RetryPolicy::with_max_attempts(0);
        let result: Result<()> = retry_with_backoff(&policy, |_| async { Ok(()) }).await;
        assert!(matches!(result, Err(RevenueCatError::RetriesExhausted { attempts: 0 })));
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let policy = RetryPolicy::with_max_attempts(1);
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(&policy, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Err(status(502)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_status_classes() {
        for code in [500, 502, 503, 504, 599] {
            assert!(is_retryable(&status(code)), "{code} should be retryable");
        }
        for code in [400, 401, 403, 404, 409, 422, 429, 499] {
            assert!(!is_retryable(&status(code)), "{code} should not be retryable");
        }
    }

    #[test]
    fn test_local_errors_not_retryable() {
        assert!(!is_retryable(&RevenueCatError::InvalidResponse("html".to_owned())));
        assert!(!is_retryable(&RevenueCatError::InvalidInput("bad".to_owned())));
        assert!(!is_retryable(&RevenueCatError::Config("bad".to_owned())));
        assert!(!is_retryable(&RevenueCatError::RetriesExhausted { attempts: 3 }));
    }
}
