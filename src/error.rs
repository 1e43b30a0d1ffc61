//! Error types for the transaction dashboard.
//!
//! Only dataset fetches produce errors. Per-record anomalies (unparseable
//! timestamps, malformed amounts) are absorbed where they occur and never
//! reach this type.

/// All errors that can occur while fetching the transaction dataset.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request could not be sent or its body could not be read.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The data store answered with a non-success status.
    #[error("data store error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or a placeholder when unreadable.
        message: String,
    },

    /// The data store rejected the credentials or the row-level policy
    /// denied access to the table.
    #[error("access denied ({status}): {message}; check the API key and table permissions")]
    AccessDenied {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Response body or a placeholder when unreadable.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required configuration value was not provided.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
}

impl FetchError {
    /// Returns `true` if the failure is a permission or credential problem
    /// rather than an outage.
    #[inline]
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(*self, Self::AccessDenied { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = FetchError::from(serde_err);
        assert!(matches!(err, FetchError::Serialization(_)));
        let msg = err.to_string();
        assert!(msg.contains("serialization error"));
    }

    #[test]
    fn error_api_display() {
        let err = FetchError::Api {
            status: 503,
            message: "upstream unavailable".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("upstream unavailable"));
        assert!(!err.is_access_denied());
    }

    #[test]
    fn error_access_denied_is_distinguishable() {
        let err = FetchError::AccessDenied {
            status: 401,
            message: "Invalid API key".to_owned(),
        };
        assert!(err.is_access_denied());
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn error_missing_config_display() {
        let err = FetchError::MissingConfig("TXN_DASHBOARD_URL");
        assert!(err.to_string().contains("TXN_DASHBOARD_URL"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FetchError>();
    }
}
