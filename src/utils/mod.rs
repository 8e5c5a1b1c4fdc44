//! Shared utilities.
//!
//! - Bounded retry on classified-transient errors

mod retry;

pub use retry::{retry_if, RetryPolicy};
