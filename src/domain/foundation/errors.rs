//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Machine-readable codes for responses the gateway emits itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Client errors
    MissingCredential,
    UnknownProvider,
    RequestBodyTooLarge,

    // Admission errors
    ConcurrencyLimitExceeded,
    RateLimitExceeded,
    CreditLimitExceeded,

    // Upstream errors
    UpstreamUnavailable,
    UpstreamTimeout,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingCredential => "MISSING_CREDENTIAL",
            ErrorCode::UnknownProvider => "UNKNOWN_PROVIDER",
            ErrorCode::RequestBodyTooLarge => "REQUEST_BODY_TOO_LARGE",
            ErrorCode::ConcurrencyLimitExceeded => "CONCURRENCY_LIMIT_EXCEEDED",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::CreditLimitExceeded => "CREDIT_LIMIT_EXCEEDED",
            ErrorCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorCode::UpstreamTimeout => "UPSTREAM_TIMEOUT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_messages_name_the_field() {
        let err = ValidationError::empty_field("authorization");
        assert_eq!(err.to_string(), "Field 'authorization' cannot be empty");

        let err = ValidationError::invalid_format("rate", "not a number");
        assert!(err.to_string().contains("rate"));
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn error_codes_render_screaming_snake_case() {
        assert_eq!(ErrorCode::RateLimitExceeded.to_string(), "RATE_LIMIT_EXCEEDED");
        assert_eq!(ErrorCode::MissingCredential.as_str(), "MISSING_CREDENTIAL");
        assert_eq!(ErrorCode::UpstreamTimeout.as_str(), "UPSTREAM_TIMEOUT");
    }
}
