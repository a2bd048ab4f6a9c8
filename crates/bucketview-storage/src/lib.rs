#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![allow(clippy::result_large_err, clippy::large_enum_variant)]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CLIENT: &str = "bucketview_storage::client";
pub const TRACING_TARGET_RETRY: &str = "bucketview_storage::retry";
pub const TRACING_TARGET_OBJECTS: &str = "bucketview_storage::objects";

pub mod client;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod operations;
pub mod types;

pub use crate::client::{MinioClient, MinioConfig, MinioCredentials, RetryPolicy, ThrottleState};
pub use crate::operations::ObjectOperations;
pub use crate::types::{ListPage, ListRequest, ObjectEntry, ObjectStorage, TagSet};

use minio::s3::error::{Error as SdkError, ErrorCode, ErrorResponse};

/// Error type for object storage operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// Configuration error.
    ///
    /// Invalid endpoint, empty credentials, zero timeouts or a retry policy
    /// that allows no attempts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request parameters (empty bucket name, empty object key).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The bucket or object does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Transient network error that may succeed on retry.
    #[error("Transient network error: {0} (retryable)")]
    TransientNetwork(String),

    /// The service asked the client to slow down.
    #[error("Rate limited: retry after {retry_after:?}")]
    RateLimited {
        /// When the client should retry the request, if the service said so.
        retry_after: Option<std::time::Duration>,
    },

    /// Operation timeout error.
    #[error("Operation timeout after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: std::time::Duration,
    },

    /// Server-side error; 5xx statuses are retryable.
    #[error("Server error: {message} (status: {status_code})")]
    ServerError {
        /// Error message from the server.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },

    /// Underlying MinIO SDK error that was not classified any further.
    #[error("MinIO client error: {0}")]
    Client(#[from] SdkError),
}

impl Error {
    /// Returns whether this error indicates a configuration issue.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Returns whether this error indicates a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Returns whether this error should trigger an automatic retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::TransientNetwork(_) => true,
            Error::RateLimited { .. } => true,
            Error::Timeout { .. } => true,
            Error::ServerError { status_code, .. } => (500..600).contains(status_code),
            Error::Config(_) => false,
            Error::InvalidRequest(_) => false,
            Error::NotFound(_) => false,
            Error::Client(_) => false,
        }
    }

    /// Returns whether the service asked the client to slow down.
    pub fn is_throttling(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// Returns the delay the service asked for before retrying, if any.
    ///
    /// Only throttling responses carry a server hint; every other retryable
    /// error falls back to the retry policy's own backoff.
    pub fn retry_delay(&self) -> Option<std::time::Duration> {
        match self {
            Error::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Returns the severity level of this error for logging purposes.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Error::Config(_) => ErrorSeverity::Critical,
            Error::NotFound(_) => ErrorSeverity::Medium,
            Error::InvalidRequest(_) => ErrorSeverity::Medium,
            Error::TransientNetwork(_) => ErrorSeverity::Low,
            Error::RateLimited { .. } => ErrorSeverity::Low,
            Error::Timeout { .. } => ErrorSeverity::Low,
            Error::ServerError { .. } => ErrorSeverity::Medium,
            Error::Client(_) => ErrorSeverity::High,
        }
    }

    /// Classifies an SDK error so the retry policy can tell transient
    /// failures from permanent ones.
    ///
    /// The SDK lowercases S3 error codes it does not know, so codes are
    /// compared without regard to case.
    pub(crate) fn from_sdk(err: SdkError) -> Self {
        match err {
            SdkError::S3Error(response) => Self::from_response(response),
            SdkError::ServerError(429) | SdkError::InvalidResponse(429, _) => {
                Error::RateLimited { retry_after: None }
            }
            SdkError::ServerError(status_code) => Error::ServerError {
                message: format!("HTTP status {status_code} without error body"),
                status_code,
            },
            SdkError::InvalidResponse(status_code, content_type) if status_code >= 500 => {
                Error::ServerError {
                    message: format!("unexpected response of type '{content_type}'"),
                    status_code,
                }
            }
            SdkError::HttpError(e) if e.is_timeout() || e.is_connect() => {
                Error::TransientNetwork(e.to_string())
            }
            other => Error::Client(other),
        }
    }

    fn from_response(response: ErrorResponse) -> Self {
        match &response.code {
            ErrorCode::NoSuchBucket | ErrorCode::NoSuchKey | ErrorCode::ResourceNotFound => {
                return Error::NotFound(response_message(&response));
            }
            ErrorCode::OtherError(code) => {
                if THROTTLING_CODES.iter().any(|known| known.eq_ignore_ascii_case(code)) {
                    return Error::RateLimited {
                        retry_after: retry_after(&response),
                    };
                }

                let server = SERVER_CODES
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(code));
                if let Some((_, status_code)) = server {
                    return Error::ServerError {
                        message: response_message(&response),
                        status_code: *status_code,
                    };
                }
            }
            _ => {}
        }

        Error::Client(SdkError::S3Error(response))
    }
}

const THROTTLING_CODES: &[&str] = &[
    "SlowDown",
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequests",
    "RequestThrottled",
];

const SERVER_CODES: &[(&str, u16)] = &[("InternalError", 500), ("ServiceUnavailable", 503)];

fn response_message(response: &ErrorResponse) -> String {
    if response.message.is_empty() {
        response.resource.clone()
    } else {
        response.message.clone()
    }
}

/// Reads a `Retry-After` header given in whole seconds.
fn retry_after(response: &ErrorResponse) -> Option<std::time::Duration> {
    let value = response.headers.get("retry-after")?.to_str().ok()?;
    let seconds = value.trim().parse::<u64>().ok()?;
    Some(std::time::Duration::from_secs(seconds))
}

/// Error severity levels for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical errors that require immediate attention.
    Critical,
    /// High-priority errors that should be investigated quickly.
    High,
    /// Medium-priority errors that should be monitored.
    Medium,
    /// Low-priority errors that are expected during normal operation.
    Low,
}

/// Specialized [`Result`] type for storage operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(Error::TransientNetwork("reset".into()).is_retryable());
        assert!(Error::RateLimited { retry_after: None }.is_retryable());
        assert!(
            Error::Timeout {
                timeout: Duration::from_secs(1)
            }
            .is_retryable()
        );
        assert!(
            Error::ServerError {
                message: "unavailable".into(),
                status_code: 503,
            }
            .is_retryable()
        );

        assert!(
            !Error::ServerError {
                message: "forbidden".into(),
                status_code: 403,
            }
            .is_retryable()
        );
        assert!(!Error::Config("bad".into()).is_retryable());
        assert!(!Error::NotFound("key".into()).is_retryable());
        assert!(!Error::InvalidRequest("key".into()).is_retryable());
    }

    #[test]
    fn only_throttling_carries_a_delay_hint() {
        let hinted = Error::RateLimited {
            retry_after: Some(Duration::from_millis(750)),
        };
        assert_eq!(hinted.retry_delay(), Some(Duration::from_millis(750)));
        assert_eq!(Error::TransientNetwork("x".into()).retry_delay(), None);
    }

    fn s3_error(code: &str) -> SdkError {
        SdkError::S3Error(ErrorResponse {
            code: ErrorCode::parse(code),
            message: format!("{code} reported by the service"),
            ..Default::default()
        })
    }

    #[test]
    fn throttling_codes_are_retried_whatever_their_case() {
        for code in ["SlowDown", "slowdown", "Throttling", "RequestLimitExceeded"] {
            let error = Error::from_sdk(s3_error(code));
            assert!(
                matches!(error, Error::RateLimited { retry_after: None }),
                "{code}: {error:?}"
            );
            assert!(error.is_retryable());
        }
    }

    #[test]
    fn throttling_honours_retry_after_header() {
        let mut response = ErrorResponse {
            code: ErrorCode::parse("SlowDown"),
            ..Default::default()
        };
        response.headers.insert("retry-after", "3".parse().unwrap());

        let error = Error::from_sdk(SdkError::S3Error(response));
        assert_eq!(error.retry_delay(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn service_codes_become_server_errors() {
        let error = Error::from_sdk(s3_error("ServiceUnavailable"));
        assert!(matches!(error, Error::ServerError { status_code: 503, .. }));
        assert!(error.is_retryable());

        let error = Error::from_sdk(s3_error("InternalError"));
        assert!(matches!(error, Error::ServerError { status_code: 500, .. }));
        assert!(error.is_retryable());
    }

    #[test]
    fn bare_status_codes_are_classified() {
        let error = Error::from_sdk(SdkError::ServerError(503));
        assert!(matches!(error, Error::ServerError { status_code: 503, .. }));
        assert!(error.is_retryable());

        let error = Error::from_sdk(SdkError::InvalidResponse(502, "text/html".into()));
        assert!(error.is_retryable());

        let error = Error::from_sdk(SdkError::ServerError(429));
        assert!(matches!(error, Error::RateLimited { .. }));

        let error = Error::from_sdk(SdkError::InvalidResponse(400, "text/html".into()));
        assert!(matches!(error, Error::Client(_)));
    }

    #[test]
    fn missing_objects_and_denials_are_permanent() {
        let error = Error::from_sdk(s3_error("NoSuchKey"));
        assert!(error.is_not_found());
        assert!(!error.is_retryable());

        let error = Error::from_sdk(s3_error("AccessDenied"));
        assert!(matches!(error, Error::Client(_)));
        assert!(!error.is_retryable());
        assert_eq!(error.severity(), ErrorSeverity::High);
    }

    #[test]
    fn severity_levels() {
        assert_eq!(Error::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(
            Error::RateLimited { retry_after: None }.severity(),
            ErrorSeverity::Low
        );
    }
}
