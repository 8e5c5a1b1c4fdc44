//! Bounded retry on classified-transient errors.
//!
//! The resolver and the HTTP probes share this combinator: an action is
//! attempted up to `max_attempts` times in total, and only errors accepted by
//! the caller's predicate lead to another attempt. Every other error is
//! returned immediately.

use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;

/// Retry policy: total attempts and the pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: usize,
    /// Delay before each retry.
    pub delay: Duration,
}

impl RetryPolicy {
    /// A policy making `max_attempts` attempts back to back.
    pub const fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    /// Runs `action`, retrying while `is_retriable` accepts the error and
    /// attempts remain.
    ///
    /// # Arguments
    ///
    /// * `action` - Produces one attempt per call
    /// * `is_retriable` - Classifies an error as transient
    ///
    /// # Returns
    ///
    /// The first success, the first non-retriable error, or the error of the
    /// last attempt once the budget is spent.
    pub async fn retry_if<T, E, A, Fut, P>(&self, action: A, is_retriable: P) -> Result<T, E>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(&E) -> bool,
    {
        // The strategy yields one delay per retry, so it holds attempts - 1 items.
        let strategy = FixedInterval::new(self.delay).take(self.max_attempts.saturating_sub(1));
        RetryIf::spawn(strategy, action, is_retriable).await
    }
}

/// Shorthand for [`RetryPolicy::retry_if`] with back-to-back attempts.
pub async fn retry_if<T, E, A, Fut, P>(max_attempts: usize, action: A, is_retriable: P) -> Result<T, E>
where
    A: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
{
    RetryPolicy::immediate(max_attempts)
        .retry_if(action, is_retriable)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Timeout,
        Refused,
    }

    #[tokio::test]
    async fn test_retries_up_to_max_attempts_on_retriable_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result: Result<(), TestError> = retry_if(
            3,
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Timeout)
                }
            },
            |e| *e == TestError::Timeout,
        )
        .await;

        assert_eq!(result, Err(TestError::Timeout));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retriable_error_fails_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result: Result<(), TestError> = retry_if(
            3,
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Refused)
                }
            },
            |e| *e == TestError::Timeout,
        )
        .await;

        assert_eq!(result, Err(TestError::Refused));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = retry_if(
            3,
            || {
                let calls = Arc::clone(&calls);
                async move {
                    let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if attempt < 3 {
                        Err(TestError::Timeout)
                    } else {
                        Ok(attempt)
                    }
                }
            },
            |e| *e == TestError::Timeout,
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_policy_never_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let _: Result<(), TestError> = retry_if(
            1,
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Timeout)
                }
            },
            |_| true,
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_waits_between_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_secs(1),
        };
        let start = tokio::time::Instant::now();
        let _: Result<(), TestError> = policy
            .retry_if(|| async { Err(TestError::Timeout) }, |_| true)
            .await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }
}
