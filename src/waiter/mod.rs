//! Polling until a remote operation reaches a terminal state.
//!
//! A [`Waiter`] polls immediately, then sleeps a jittered, exponentially
//! growing delay between polls. It stops on success, on a terminal failure,
//! when the total budget runs out, or when its cancellation token fires.

mod delay;

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{
    CHANGE_MAX_DELAY, CHANGE_MIN_DELAY, OPERATION_MAX_DELAY, OPERATION_MIN_DELAY,
};
use crate::error_handling::WaitError;

pub use delay::compute_delay;

/// What a classifier decided about one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDecision {
    /// Not terminal yet, poll again.
    Retry,
    /// The awaited state was reached.
    Succeed,
    /// A terminal failure with its reason.
    Fail(String),
}

/// Poll timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    min_delay: Duration,
    max_delay: Duration,
}

impl Waiter {
    /// Creates a waiter, rejecting `min_delay > max_delay`.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Result<Self, WaitError> {
        if min_delay > max_delay {
            return Err(WaitError::InvalidDelays {
                min: min_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            min_delay,
            max_delay,
        })
    }

    /// Timing for record change propagation.
    pub const fn for_changes() -> Self {
        Self {
            min_delay: CHANGE_MIN_DELAY,
            max_delay: CHANGE_MAX_DELAY,
        }
    }

    /// Timing for registrar operations.
    pub const fn for_operations() -> Self {
        Self {
            min_delay: OPERATION_MIN_DELAY,
            max_delay: OPERATION_MAX_DELAY,
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Polls until `classify` reports a terminal decision.
    ///
    /// # Arguments
    ///
    /// * `cancel` - Aborts the wait promptly, including mid-sleep
    /// * `max_wait` - Total budget, must be non-zero
    /// * `poll` - Produces one poll per call
    /// * `classify` - Maps a poll result to a [`PollDecision`]
    ///
    /// # Errors
    ///
    /// * [`WaitError::InvalidMaxWait`] for a zero budget
    /// * [`WaitError::Failed`] when `classify` reports a terminal failure
    /// * [`WaitError::DeadlineExceeded`] when no budget is left for another delay
    /// * [`WaitError::Cancelled`] when `cancel` fires
    pub async fn wait<T, E, F, Fut, C>(
        &self,
        cancel: &CancellationToken,
        max_wait: Duration,
        mut poll: F,
        classify: C,
    ) -> Result<(), WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&Result<T, E>) -> PollDecision,
    {
        if max_wait.is_zero() {
            return Err(WaitError::InvalidMaxWait);
        }

        let deadline = Instant::now() + max_wait;
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WaitError::Cancelled),
                _ = time::sleep_until(deadline) => {
                    return Err(WaitError::DeadlineExceeded { max_wait });
                }
                result = poll() => result,
            };

            match classify(&result) {
                PollDecision::Succeed => return Ok(()),
                PollDecision::Fail(reason) => return Err(WaitError::Failed(reason)),
                PollDecision::Retry => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            // No room left for another full delay followed by a poll.
            if remaining <= self.min_delay || remaining.is_zero() {
                return Err(WaitError::DeadlineExceeded { max_wait });
            }

            let delay = compute_delay(attempt, self.min_delay, self.max_delay, remaining);
            debug!("Poll {attempt} not terminal, sleeping {delay:?}");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WaitError::Cancelled),
                _ = time::sleep(delay) => {}
            }
        }
    }
}
