//! Error handling.
//!
//! Errors are split by the three ways a failure can end:
//! - **Transient**: classified timeouts, retried a bounded number of times
//!   (see [`crate::utils::retry_if`]) or polled again by the waiter
//! - **NotFound**: typed, matchable terminal outcomes such as NXDOMAIN or a
//!   zone lookup miss
//! - **Fatal**: provider rejections, invalid input and exceeded deadlines,
//!   which abort the current zone only

mod types;

// Re-export public API
pub use types::{ApiError, InitializationError, ResolveError, WaitError, ZoneError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_resolve_error_classification() {
        let nx = ResolveError::NotFound {
            domain: "missing.example.com".to_string(),
        };
        assert_eq!(nx.classification(), "NXDOMAIN");
        assert!(nx.is_not_found());

        let servfail = ResolveError::Failed {
            domain: "example.com".to_string(),
            classification: "SERVFAIL".to_string(),
        };
        assert_eq!(servfail.classification(), "SERVFAIL");
        assert!(!servfail.is_not_found());

        let timeout = ResolveError::Timeout {
            domain: "example.com".to_string(),
            attempts: 3,
        };
        assert_eq!(timeout.classification(), "timeout");
    }

    #[test]
    fn test_zone_error_wraps_wait_error() {
        let err: ZoneError = WaitError::DeadlineExceeded {
            max_wait: Duration::from_secs(60),
        }
        .into();
        assert!(matches!(
            err,
            ZoneError::Wait(WaitError::DeadlineExceeded { .. })
        ));
        assert!(err.to_string().contains("exceeded max wait time"));
    }

    #[test]
    fn test_zone_not_found_is_matchable() {
        let err = ZoneError::ZoneNotFound {
            zone: "example.com".to_string(),
        };
        assert!(err.is_zone_not_found());
        assert_eq!(err.to_string(), "hosted zone not found: example.com");

        let api: ZoneError = ApiError::new("ListHostedZones", "throttled").into();
        assert!(!api.is_zone_not_found());
        assert_eq!(api.to_string(), "ListHostedZones failed: throttled");
    }
}
