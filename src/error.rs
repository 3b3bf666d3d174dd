//! Error types for static asset serving

use thiserror::Error;

/// Result type alias for asset operations
pub type Result<T> = std::result::Result<T, AssetError>;

/// Error types that can occur while serving an asset
#[derive(Error, Debug, Clone)]
pub enum AssetError {
    /// Missing resource, a directory, or a path outside the root
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The selected variant exists but could not be opened
    #[error("Failed to open resource stream: {0}")]
    StreamOpenFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A computed header value could not be encoded
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl AssetError {
    /// Create a NotFound error for a request path
    pub fn not_found(path: impl Into<String>) -> Self {
        AssetError::NotFound(path.into())
    }

    /// Convert error to HTTP status code
    ///
    /// Anything that prevents a body from being served for an existing
    /// request path is reported as 404 without further detail. Header
    /// encoding failures come from the service's own configuration and
    /// are reported as 500.
    pub fn to_http_status(&self) -> u16 {
        match self {
            AssetError::NotFound(_) => 404,
            AssetError::StreamOpenFailure(_) => 404,

            AssetError::ConfigError(_) => 500,
            AssetError::InvalidHeader(_) => 500,
        }
    }

    /// Whether the error is one the client sees as a plain 404
    pub fn is_not_found(&self) -> bool {
        self.to_http_status() == 404
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(AssetError::not_found("/missing.css").to_http_status(), 404);
        assert_eq!(
            AssetError::StreamOpenFailure("permission denied".to_string()).to_http_status(),
            404
        );
    }

    #[test]
    fn test_config_error_maps_to_500() {
        let error = AssetError::ConfigError("bad charset".to_string());
        assert_eq!(error.to_http_status(), 500);
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_invalid_header_maps_to_500() {
        let error = AssetError::InvalidHeader("Content-Type".to_string());
        assert_eq!(error.to_http_status(), 500);
        assert!(!error.is_not_found());
    }
}
