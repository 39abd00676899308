//! UnifiedError trait implementation for ZeroPassError

use super::types::{UnifiedError, ZeroPassError};

const STALE_REFERENCE_HINT: &str =
    "The rule set may have been deleted or is not visible yet. Refresh and reselect it.";
const OWNERSHIP_HINT: &str = "This record belongs to another session. Reload your own rule sets.";
const NETWORK_HINT: &str = "The backend may be starting up. Check connectivity and try again.";

impl UnifiedError for ZeroPassError {
    fn error_code(&self) -> &str {
        match self {
            Self::Network { .. } => "ZP_NETWORK",
            Self::Http { .. } => "ZP_HTTP",
            Self::StaleReference { .. } => "ZP_STALE_REFERENCE",
            Self::Ownership { .. } => "ZP_OWNERSHIP",
            Self::MalformedInput { .. } => "ZP_MALFORMED_INPUT",
            Self::InvalidInput { .. } => "ZP_INVALID_INPUT",
            Self::Storage { .. } => "ZP_STORAGE",
            Self::Json { .. } => "ZP_JSON",
            Self::Io { .. } => "ZP_IO",
            Self::Config { .. } => "ZP_CONFIG",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::Http { message, .. }
            | Self::StaleReference { message, .. }
            | Self::Ownership { message, .. }
            | Self::MalformedInput { message, .. }
            | Self::InvalidInput { message, .. }
            | Self::Storage { message, .. }
            | Self::Json { message, .. }
            | Self::Io { message, .. }
            | Self::Config { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Network { context, .. }
            | Self::Http { context, .. }
            | Self::StaleReference { context, .. }
            | Self::Ownership { context, .. }
            | Self::MalformedInput { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::Storage { context, .. }
            | Self::Json { context, .. }
            | Self::Io { context, .. }
            | Self::Config { context, .. } => context.as_deref(),
        }
    }

    fn hint(&self) -> Option<&str> {
        match self {
            Self::StaleReference { .. } => Some(STALE_REFERENCE_HINT),
            Self::Ownership { .. } => Some(OWNERSHIP_HINT),
            Self::Network { .. } => Some(NETWORK_HINT),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status_code, .. } => matches!(status_code, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResultExt;

    #[test]
    fn test_error_codes() {
        assert_eq!(ZeroPassError::network("down").error_code(), "ZP_NETWORK");
        assert_eq!(
            ZeroPassError::stale_reference("gone", "rs-1").error_code(),
            "ZP_STALE_REFERENCE"
        );
        assert_eq!(ZeroPassError::ownership("nope").error_code(), "ZP_OWNERSHIP");
    }

    #[test]
    fn test_stale_reference_carries_hint() {
        let err = ZeroPassError::stale_reference("Rule set not found", "rs-1");
        assert!(err.hint().unwrap().contains("Refresh and reselect"));
        assert!(ZeroPassError::invalid_input("bad").hint().is_none());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ZeroPassError::network("timeout").is_retryable());
        assert!(ZeroPassError::http(503, "unavailable").is_retryable());
        assert!(!ZeroPassError::http(400, "bad request").is_retryable());
        assert!(!ZeroPassError::ownership("mismatch").is_retryable());
    }

    #[test]
    fn test_rule_set_not_found_detection() {
        assert!(ZeroPassError::http(404, "Rule set not found").is_rule_set_not_found());
        assert!(!ZeroPassError::http(404, "Scenario not found").is_rule_set_not_found());
        assert!(ZeroPassError::http(500, "404: Rule set not found").is_rule_set_not_found());
        assert!(!ZeroPassError::http(400, "Rule set not found").is_rule_set_not_found());
        assert!(ZeroPassError::stale_reference("gone", "rs-1").is_rule_set_not_found());
    }

    #[test]
    fn test_result_context_keeps_variant() {
        let result: Result<(), ZeroPassError> = Err(ZeroPassError::storage("quota exceeded"));
        let err = result.context("writing cache entry").unwrap_err();
        assert_eq!(err.error_code(), "ZP_STORAGE");
        assert_eq!(err.context(), Some("writing cache entry"));
    }
}
