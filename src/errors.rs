// ABOUTME: Unified error handling for the WHOOP MCP server
// ABOUTME: Classifies configuration, network, authentication, rate-limit, and upstream failures
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Unified Error Handling System
//!
//! Every failure that can reach a tool caller is classified into one of the
//! variants below. The executor boundary guarantees that no raw transport
//! error or panic crosses into an MCP response: tool handlers convert an
//! [`AppError`] into a structured tool error with a stable code string.

use serde_json::{json, Value};
use thiserror::Error;

/// Unified error type for the application
#[derive(Debug, Error)]
pub enum AppError {
    /// Required configuration is missing or invalid at startup. Fatal: the
    /// server refuses to start serving tool calls.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure (connection refused, timeout, DNS). Never
    /// retried by this layer.
    #[error("Failed to reach the WHOOP API: {0}")]
    Network(String),

    /// The access token is invalid and could not be refreshed. Carries the
    /// remediation instruction to re-run the bootstrap flow.
    #[error("WHOOP authentication failed: {reason}. Re-run whoop-auth-setup to obtain fresh tokens")]
    Authentication {
        /// Why the credential is unusable
        reason: String,
    },

    /// The WHOOP API returned 429. Never auto-retried; the caller decides.
    #[error("WHOOP API rate limit exceeded{}", retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimit {
        /// Parsed `Retry-After` header value, if the API sent one
        retry_after_secs: Option<u64>,
    },

    /// Any other non-2xx status from the WHOOP API
    #[error("WHOOP API request failed with status {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body, kept for diagnostics
        body: String,
    },

    /// Tool parameters failed validation before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Network/transport error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Authentication failure requiring re-auth
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Invalid tool input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Stable machine-readable code for structured tool responses
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::RateLimit { .. } => "RATE_LIMIT_ERROR",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// Structured representation attached to MCP tool error responses
    #[must_use]
    pub fn to_details(&self) -> Value {
        match self {
            Self::RateLimit { retry_after_secs } => json!({
                "code": self.code(),
                "message": self.to_string(),
                "retry_after_secs": retry_after_secs,
            }),
            Self::Upstream { status, body } => json!({
                "code": self.code(),
                "message": self.to_string(),
                "status": status,
                "body": body,
            }),
            _ => json!({
                "code": self.code(),
                "message": self.to_string(),
            }),
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::config("x").code(), "CONFIGURATION_ERROR");
        assert_eq!(AppError::network("x").code(), "NETWORK_ERROR");
        assert_eq!(AppError::auth("x").code(), "AUTHENTICATION_ERROR");
        assert_eq!(
            AppError::RateLimit {
                retry_after_secs: None
            }
            .code(),
            "RATE_LIMIT_ERROR"
        );
    }

    #[test]
    fn test_authentication_error_carries_remediation() {
        let err = AppError::auth("token refresh failed with status 400");
        assert!(err.to_string().contains("whoop-auth-setup"));
    }

    #[test]
    fn test_rate_limit_display_includes_retry_after() {
        let err = AppError::RateLimit {
            retry_after_secs: Some(42),
        };
        assert!(err.to_string().contains("42"));

        let details = err.to_details();
        assert_eq!(details["retry_after_secs"], 42);
        assert_eq!(details["code"], "RATE_LIMIT_ERROR");
    }

    #[test]
    fn test_upstream_details_preserve_status_and_body() {
        let err = AppError::Upstream {
            status: 503,
            body: "maintenance".into(),
        };
        let details = err.to_details();
        assert_eq!(details["status"], 503);
        assert_eq!(details["body"], "maintenance");
    }
}
