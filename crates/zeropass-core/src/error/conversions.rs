//! From trait implementations for ZeroPassError conversions

use super::types::ZeroPassError;

impl From<std::io::Error> for ZeroPassError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for ZeroPassError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<reqwest::Error> for ZeroPassError {
    fn from(error: reqwest::Error) -> Self {
        let url = error.url().map(|u| u.to_string());
        match error.status() {
            Some(status) => Self::Http {
                message: error.to_string(),
                status_code: status.as_u16(),
                url,
                context: None,
            },
            None if error.is_decode() => Self::json(error.to_string()),
            None => Self::Network {
                message: error.to_string(),
                url,
                context: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnifiedError;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ZeroPassError = io.into();
        assert_eq!(err.error_code(), "ZP_IO");
        assert!(err.message().contains("denied"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ZeroPassError = parse.into();
        assert_eq!(err.error_code(), "ZP_JSON");
    }
}
