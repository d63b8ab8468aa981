//! Error types for lodkit.

use thiserror::Error;

/// Result type alias using lodkit's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lodkit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration or setup error (the only class surfaced by the label engine)
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed, or the store rejected the query
    #[error("Request error: {0}")]
    Request(String),

    /// No parser is registered for a response content type
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// RDF syntax error in a response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("query executor is required".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: query executor is required"
        );
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_error_display_unsupported_content_type() {
        let err = Error::UnsupportedContentType("text/html".to_string());
        assert_eq!(err.to_string(), "Unsupported content type: text/html");
    }

    #[test]
    fn test_error_display_parse() {
        let err = Error::Parse("unexpected end of file".to_string());
        assert_eq!(err.to_string(), "Parse error: unexpected end of file");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::Parse("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Parse"));
    }
}
