//! Error types for the policy X-Ray engine
//!
//! Fetch and store errors stay separate so the orchestrator can decide, per
//! boundary, which failures become error verdicts and which degrade silently.

use thiserror::Error;

/// Crate-level error for configuration and inbound validation
#[derive(Error, Debug)]
pub enum XrayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid policy id: {0}")]
    InvalidPolicyId(String),
}

/// Errors raised by the script metadata fetcher
///
/// A provider 404 is not represented here: fetch operations return
/// `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("provider request timed out: {endpoint}")]
    Timeout { endpoint: String },

    #[error("provider API error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// Errors raised by verdict storage backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt cache entry for {policy_id}: {reason}")]
    Corrupt { policy_id: String, reason: String },

    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_detection() {
        let timeout = FetchError::Timeout {
            endpoint: "/scripts/abc".to_string(),
        };
        assert!(timeout.is_timeout());

        let status = FetchError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(!status.is_timeout());
        assert_eq!(status.to_string(), "provider API error 500: boom");
    }

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::Corrupt {
            policy_id: "abc".to_string(),
            reason: "EOF while parsing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt cache entry for abc: EOF while parsing"
        );
    }
}
