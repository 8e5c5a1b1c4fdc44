//! Waiting on registrar operations.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::api::RegistrarApi;
use super::types::{OperationDetail, OperationStatus};
use crate::error_handling::{ApiError, WaitError};
use crate::waiter::{PollDecision, Waiter};

/// Maps one operation poll to a waiter decision.
///
/// Transport errors are retried: registrar status reads fail transiently
/// while long operations are in flight.
pub fn classify_operation(
    expected: OperationStatus,
    result: &Result<OperationDetail, ApiError>,
) -> PollDecision {
    match result {
        Ok(detail) if detail.status == expected => PollDecision::Succeed,
        Ok(detail) if detail.status.is_failure() => PollDecision::Fail(
            detail
                .message
                .clone()
                .unwrap_or_else(|| format!("operation {} {}", detail.id, detail.status)),
        ),
        Ok(_) | Err(_) => PollDecision::Retry,
    }
}

/// Polls `operation_id` until it reaches `expected`.
pub async fn wait_for_operation(
    registrar: &dyn RegistrarApi,
    cancel: &CancellationToken,
    operation_id: &str,
    expected: OperationStatus,
    max_wait: Duration,
) -> Result<(), WaitError> {
    Waiter::for_operations()
        .wait(
            cancel,
            max_wait,
            || registrar.get_operation_detail(operation_id),
            |result| classify_operation(expected, result),
        )
        .await
}
