//! Constructor methods for ZeroPassError

use super::types::ZeroPassError;

impl ZeroPassError {
    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            url: None,
            context: None,
        }
    }

    /// Create a network error for a specific URL
    pub fn network_with_url(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            url: Some(url.into()),
            context: None,
        }
    }

    /// Create an HTTP status error
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            status_code,
            url: None,
            context: None,
        }
    }

    /// Create a stale reference error for the given resource id
    pub fn stale_reference(message: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::StaleReference {
            message: message.into(),
            resource_id: resource_id.into(),
            context: None,
        }
    }

    /// Create an ownership error
    pub fn ownership(message: impl Into<String>) -> Self {
        Self::Ownership {
            message: message.into(),
            owner: None,
            context: None,
        }
    }

    /// Create an ownership error naming the actual owner
    pub fn ownership_with_owner(message: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::Ownership {
            message: message.into(),
            owner: Some(owner.into()),
            context: None,
        }
    }

    /// Create a malformed input error
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
            context: None,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
            context: None,
        }
    }

    /// Create an invalid input error for a named field
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
            context: None,
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            context: None,
        }
    }

    /// Create a JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            context: None,
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            context: None,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Replace the context of this error
    pub fn with_context(mut self, new_context: impl Into<String>) -> Self {
        let slot = match &mut self {
            Self::Network { context, .. }
            | Self::Http { context, .. }
            | Self::StaleReference { context, .. }
            | Self::Ownership { context, .. }
            | Self::MalformedInput { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::Storage { context, .. }
            | Self::Json { context, .. }
            | Self::Io { context, .. }
            | Self::Config { context, .. } => context,
        };
        *slot = Some(new_context.into());
        self
    }

    /// Whether the backend reported a missing rule set.
    ///
    /// `/simulate` re-wraps its own 404 as a 500 with detail
    /// `"404: Rule set not found"`, so both statuses are accepted.
    pub fn is_rule_set_not_found(&self) -> bool {
        match self {
            Self::StaleReference { .. } => true,
            Self::Http {
                status_code: 404 | 500,
                message,
                ..
            } => message.to_ascii_lowercase().contains("rule set not found"),
            _ => false,
        }
    }
}
