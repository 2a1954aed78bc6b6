//! Reliability patterns for RevenueCat API calls.
//!
//! Provides retry with exponential backoff for transient upstream failures.

mod retry;

pub use retry::{RetryPolicy, is_retryable, retry_with_backoff};
