//! Error types for strongbox.
//!
//! This module provides a unified error type [`StrongboxError`] for all configuration
//! operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Validation**: invalid bucket/object names, invalid retention modes and missing
//!   configuration. Raised before any network interaction.
//! - **Decode**: a malformed wire document in a successful GET response.
//! - **Service**: any non-success status code, carrying the store's own error code.
//! - **Transport**: connection failures, timeouts and cancellation, passed through as-is.
//! - **Configuration**: invalid client settings.
//!
//! # Example
//!
//! ```rust
//! use strongbox::error::{Result, StrongboxError};
//!
//! fn require_bucket(bucket: &str) -> Result<()> {
//!     if bucket.is_empty() {
//!         return Err(StrongboxError::InvalidBucketName(
//!             "Bucket name cannot be empty".into(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_bucket("").unwrap_err().is_validation());
//! ```
//!
//! # Distinguishing "not configured" from failures
//!
//! A bucket without default encryption (or an object without retention) is reported by
//! the store as a service error with a dedicated code:
//!
//! ```rust
//! use strongbox::error::{ServiceError, StrongboxError};
//!
//! let err = StrongboxError::Service(ServiceError::new(
//!     404,
//!     "ServerSideEncryptionConfigurationNotFoundError",
//!     "The server side encryption configuration was not found",
//!     "photos",
//! ));
//! assert_eq!(err.service_code(), Some("ServerSideEncryptionConfigurationNotFoundError"));
//! ```

use std::io;
use thiserror::Error;

/// Store error code returned when an object has no retention configuration.
pub const NO_SUCH_OBJECT_LOCK_CONFIGURATION: &str = "NoSuchObjectLockConfiguration";

/// Store error code returned when a bucket has no default encryption configuration.
pub const SSE_CONFIGURATION_NOT_FOUND: &str = "ServerSideEncryptionConfigurationNotFoundError";

/// Main error type for strongbox operations.
#[derive(Error, Debug)]
pub enum StrongboxError {
    // Validation errors
    #[error("Invalid bucket name: {0}")]
    InvalidBucketName(String),

    #[error("Invalid object name: {0}")]
    InvalidObjectName(String),

    #[error("Invalid retention mode `{0}`")]
    InvalidRetentionMode(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Wire document errors
    #[error("Decode error: {0}")]
    Decode(String),

    // Store errors
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Operation cancelled")]
    Cancelled,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StrongboxError {
    /// Check if the error was raised before any network interaction.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StrongboxError::InvalidBucketName(_)
                | StrongboxError::InvalidObjectName(_)
                | StrongboxError::InvalidRetentionMode(_)
                | StrongboxError::InvalidArgument(_)
        )
    }

    /// Check if the error is cancellation-class.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StrongboxError::Cancelled)
    }

    /// Check if error is retryable.
    ///
    /// This is a classification aid for callers; strongbox itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            StrongboxError::Transport(_) | StrongboxError::Timeout(_) => true,
            StrongboxError::Service(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// The store's error code, if this is a service error.
    pub fn service_code(&self) -> Option<&str> {
        match self {
            StrongboxError::Service(e) => Some(e.code.as_str()),
            _ => None,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StrongboxError::InvalidBucketName(_)
            | StrongboxError::InvalidObjectName(_)
            | StrongboxError::InvalidRetentionMode(_)
            | StrongboxError::InvalidArgument(_) => "validation",
            StrongboxError::Decode(_) => "decode",
            StrongboxError::Service(_) => "service",
            StrongboxError::Transport(_) | StrongboxError::Timeout(_) => "transport",
            StrongboxError::Cancelled => "cancelled",
            StrongboxError::Config(_) | StrongboxError::InvalidConfig { .. } => "config",
            StrongboxError::Io(_) | StrongboxError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for StrongboxError {
    fn from(e: serde_json::Error) -> Self {
        StrongboxError::Config(e.to_string())
    }
}

/// Structured error reported by the object store for a non-success response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{code} ({status}): {message} [bucket: {bucket}{}{}]",
    labelled(", object: ", .object),
    labelled(", request id: ", .request_id)
)]
pub struct ServiceError {
    /// HTTP status code of the response.
    pub status: u16,
    /// The store's error code (e.g. `NoSuchObjectLockConfiguration`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Bucket the request targeted.
    pub bucket: String,
    /// Object the request targeted, for object-scoped operations.
    pub object: Option<String>,
    /// Resource reported by the store.
    pub resource: Option<String>,
    /// Request ID reported by the store.
    pub request_id: Option<String>,
    /// Host ID reported by the store.
    pub host_id: Option<String>,
}

impl ServiceError {
    /// Create a new service error for a bucket-scoped request.
    pub fn new(
        status: u16,
        code: impl Into<String>,
        message: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            bucket: bucket.into(),
            object: None,
            resource: None,
            request_id: None,
            host_id: None,
        }
    }

    /// Attach the object the request targeted.
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Check whether the store reported that the configuration does not exist.
    pub fn is_configuration_absent(&self) -> bool {
        self.code == NO_SUCH_OBJECT_LOCK_CONFIGURATION || self.code == SSE_CONFIGURATION_NOT_FOUND
    }

    /// Check if the store signalled a transient condition.
    pub fn is_retryable(&self) -> bool {
        self.status >= 500 || self.status == 429 || self.code == "SlowDown"
    }
}

fn labelled(label: &str, value: &Option<String>) -> String {
    value
        .as_ref()
        .map(|v| format!("{}{}", label, v))
        .unwrap_or_default()
}

/// Result type alias for strongbox operations.
pub type Result<T> = std::result::Result<T, StrongboxError>;
