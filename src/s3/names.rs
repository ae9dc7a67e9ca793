//! Bucket and object name validation.

use crate::error::{Result, StrongboxError};

/// Validates bucket and object names before a request is built.
pub trait NameValidator: Send + Sync {
    /// Check a bucket name.
    fn validate_bucket_name(&self, name: &str) -> Result<()>;

    /// Check an object name.
    fn validate_object_name(&self, name: &str) -> Result<()>;
}

/// S3 naming rules.
///
/// The relaxed rules accept legacy bucket names with upper-case letters, underscores
/// and colons; strict mode only accepts DNS-compatible names.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3NameValidator {
    strict: bool,
}

impl S3NameValidator {
    /// Validator with relaxed bucket name rules.
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Validator with DNS-compatible bucket name rules.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    fn allowed(&self, c: char) -> bool {
        if self.strict {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-'
        } else {
            c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':')
        }
    }

    fn alphanumeric_edge(&self, c: char) -> bool {
        if self.strict {
            c.is_ascii_lowercase() || c.is_ascii_digit()
        } else {
            c.is_ascii_alphanumeric()
        }
    }
}

fn bucket_error(reason: &str) -> StrongboxError {
    StrongboxError::InvalidBucketName(reason.to_string())
}

fn looks_like_ipv4(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

impl NameValidator for S3NameValidator {
    fn validate_bucket_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(bucket_error("Bucket name cannot be empty"));
        }
        if name.len() < 3 {
            return Err(bucket_error("Bucket name cannot be shorter than 3 characters"));
        }
        if name.len() > 63 {
            return Err(bucket_error("Bucket name cannot be longer than 63 characters"));
        }
        if looks_like_ipv4(name) {
            return Err(bucket_error("Bucket name cannot be an ip address"));
        }
        if name.contains("..") || name.contains(".-") || name.contains("-.") {
            return Err(bucket_error("Bucket name contains invalid characters"));
        }

        let first = name.chars().next().unwrap_or_default();
        let last = name.chars().last().unwrap_or_default();
        if !self.alphanumeric_edge(first)
            || !self.alphanumeric_edge(last)
            || !name.chars().all(|c| self.allowed(c))
        {
            return Err(bucket_error("Bucket name contains invalid characters"));
        }

        Ok(())
    }

    fn validate_object_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(StrongboxError::InvalidObjectName(
                "Object name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
