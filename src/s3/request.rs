//! Request descriptors for the retention and encryption sub-resources.
//!
//! The builder validates names and configuration, encodes the document and computes
//! its digests. It never touches the network; the resulting [`RequestDescriptor`] is
//! executed by a [`Transport`](crate::client::Transport).

use super::checksum::{Digester, StandardDigester, EMPTY_SHA256_HEX};
use super::encryption::{encryption_to_xml, EncryptionConfiguration};
use super::names::{NameValidator, S3NameValidator};
use super::retention::{retention_to_xml, RetentionConfiguration, RetentionMode};
use crate::error::{Result, StrongboxError};
use chrono::{DateTime, Utc};
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Query marker addressing the object retention sub-resource.
pub const RETENTION_QUERY: &str = "retention";
/// Query parameter selecting an object version.
pub const VERSION_ID_QUERY: &str = "versionId";
/// Query marker addressing the bucket encryption sub-resource.
pub const ENCRYPTION_QUERY: &str = "encryption";

/// Header authorizing changes to a GOVERNANCE lock.
pub const BYPASS_GOVERNANCE_HEADER: &str = "x-amz-bypass-governance-retention";
/// Header carrying the base64 MD5 of the body.
pub const CONTENT_MD5_HEADER: &str = "content-md5";
/// Header carrying the hex SHA-256 of the body.
pub const CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";

/// Operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SetRetention,
    GetRetention,
    SetEncryption,
    GetEncryption,
    RemoveEncryption,
}

impl Operation {
    /// Operation name used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SetRetention => "PutObjectRetention",
            Operation::GetRetention => "GetObjectRetention",
            Operation::SetEncryption => "PutBucketEncryption",
            Operation::GetEncryption => "GetBucketEncryption",
            Operation::RemoveEncryption => "DeleteBucketEncryption",
        }
    }

    /// HTTP method of the operation.
    pub fn method(&self) -> Method {
        match self {
            Operation::SetRetention | Operation::SetEncryption => Method::PUT,
            Operation::GetRetention | Operation::GetEncryption => Method::GET,
            Operation::RemoveEncryption => Method::DELETE,
        }
    }

    /// Status codes the store uses to report success.
    pub fn success_statuses(&self) -> &'static [u16] {
        match self {
            Operation::SetRetention | Operation::RemoveEncryption => &[200, 204],
            Operation::GetRetention | Operation::SetEncryption | Operation::GetEncryption => &[200],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for setting object retention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetRetentionOptions {
    /// Retention mode; `None` clears the retention.
    pub mode: Option<RetentionMode>,
    /// Instant until which the object version is retained.
    pub retain_until: Option<DateTime<Utc>>,
    /// Version to lock; the current version when unset or empty.
    pub version_id: Option<String>,
    /// Send the governance bypass header.
    pub governance_bypass: bool,
}

impl SetRetentionOptions {
    /// Options applying the given configuration.
    pub fn new(config: RetentionConfiguration) -> Self {
        Self {
            mode: config.mode,
            retain_until: config.retain_until,
            ..Default::default()
        }
    }

    /// Target a specific object version.
    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    /// Request a governance bypass.
    pub fn governance_bypass(mut self, bypass: bool) -> Self {
        self.governance_bypass = bypass;
        self
    }

    /// The retention configuration these options describe.
    pub fn configuration(&self) -> RetentionConfiguration {
        RetentionConfiguration::new(self.mode, self.retain_until)
    }
}

/// Transport-independent description of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// The operation this request performs.
    pub operation: Operation,
    /// HTTP method.
    pub method: Method,
    /// Target bucket.
    pub bucket: String,
    /// Target object, for object-scoped operations.
    pub object: Option<String>,
    /// Query parameters. Sub-resource markers have empty values.
    pub query: BTreeMap<String, String>,
    /// Extra headers (lower-case names).
    pub headers: BTreeMap<String, String>,
    /// Encoded body, if any.
    pub body: Option<Vec<u8>>,
    /// Length of the body in bytes.
    pub content_length: u64,
    /// Base64 MD5 of the body.
    pub content_md5: Option<String>,
    /// Hex SHA-256 of the body (the empty-payload digest when there is none).
    pub content_sha256: String,
}

impl RequestDescriptor {
    fn new(operation: Operation, bucket: &str, object: Option<&str>) -> Self {
        Self {
            operation,
            method: operation.method(),
            bucket: bucket.to_string(),
            object: object.map(str::to_string),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
            content_length: 0,
            content_md5: None,
            content_sha256: EMPTY_SHA256_HEX.to_string(),
        }
    }

    /// Path of the addressed resource, e.g. `/bucket/object`.
    pub fn resource_path(&self) -> String {
        match self.object {
            Some(ref object) => format!("/{}/{}", self.bucket, object),
            None => format!("/{}", self.bucket),
        }
    }

    /// Look up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The body as UTF-8 text, for diagnostics.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok())
    }
}

/// Builds validated [`RequestDescriptor`]s.
#[derive(Clone)]
pub struct RequestBuilder {
    names: Arc<dyn NameValidator>,
    digester: Arc<dyn Digester>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(Arc::new(S3NameValidator::new()), Arc::new(StandardDigester))
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder").finish_non_exhaustive()
    }
}

impl RequestBuilder {
    /// Create a builder with the given collaborators.
    pub fn new(names: Arc<dyn NameValidator>, digester: Arc<dyn Digester>) -> Self {
        Self { names, digester }
    }

    /// PUT object retention.
    pub fn set_retention(
        &self,
        bucket: &str,
        object: &str,
        opts: &SetRetentionOptions,
    ) -> Result<RequestDescriptor> {
        self.names.validate_bucket_name(bucket)?;
        self.names.validate_object_name(object)?;

        // A COMPLIANCE lock cannot be overridden; never suggest otherwise on the wire.
        if opts.governance_bypass && opts.mode == Some(RetentionMode::Compliance) {
            return Err(StrongboxError::InvalidArgument(
                "governance bypass cannot be combined with COMPLIANCE mode".to_string(),
            ));
        }

        let mut request = RequestDescriptor::new(Operation::SetRetention, bucket, Some(object));
        request.query.insert(RETENTION_QUERY.to_string(), String::new());
        add_version_id(&mut request, opts.version_id.as_deref());

        if opts.governance_bypass {
            request
                .headers
                .insert(BYPASS_GOVERNANCE_HEADER.to_string(), "true".to_string());
        }

        let body = retention_to_xml(&opts.configuration()).into_bytes();
        self.attach_body(&mut request, body);
        Ok(request)
    }

    /// GET object retention.
    pub fn get_retention(
        &self,
        bucket: &str,
        object: &str,
        version_id: Option<&str>,
    ) -> Result<RequestDescriptor> {
        self.names.validate_bucket_name(bucket)?;
        self.names.validate_object_name(object)?;

        let mut request = RequestDescriptor::new(Operation::GetRetention, bucket, Some(object));
        request.query.insert(RETENTION_QUERY.to_string(), String::new());
        add_version_id(&mut request, version_id);
        Ok(request)
    }

    /// PUT bucket default encryption.
    ///
    /// Unlike retention, the configuration is mandatory.
    pub fn set_encryption(
        &self,
        bucket: &str,
        config: Option<&EncryptionConfiguration>,
    ) -> Result<RequestDescriptor> {
        self.names.validate_bucket_name(bucket)?;
        let config = config.ok_or_else(|| {
            StrongboxError::InvalidArgument("configuration cannot be empty".to_string())
        })?;

        let mut request = RequestDescriptor::new(Operation::SetEncryption, bucket, None);
        request.query.insert(ENCRYPTION_QUERY.to_string(), String::new());

        // The store rejects default-encryption changes without Content-MD5.
        let body = encryption_to_xml(config).into_bytes();
        self.attach_body(&mut request, body);
        Ok(request)
    }

    /// GET bucket default encryption.
    pub fn get_encryption(&self, bucket: &str) -> Result<RequestDescriptor> {
        self.bucket_encryption_request(Operation::GetEncryption, bucket)
    }

    /// DELETE bucket default encryption.
    pub fn remove_encryption(&self, bucket: &str) -> Result<RequestDescriptor> {
        self.bucket_encryption_request(Operation::RemoveEncryption, bucket)
    }

    fn bucket_encryption_request(&self, operation: Operation, bucket: &str) -> Result<RequestDescriptor> {
        self.names.validate_bucket_name(bucket)?;

        let mut request = RequestDescriptor::new(operation, bucket, None);
        request.query.insert(ENCRYPTION_QUERY.to_string(), String::new());
        Ok(request)
    }

    fn attach_body(&self, request: &mut RequestDescriptor, body: Vec<u8>) {
        request.content_length = body.len() as u64;
        request.content_md5 = Some(self.digester.content_md5(&body));
        request.content_sha256 = self.digester.content_sha256(&body);
        request.body = Some(body);
    }
}

fn add_version_id(request: &mut RequestDescriptor, version_id: Option<&str>) {
    if let Some(version_id) = version_id.filter(|v| !v.is_empty()) {
        request
            .query
            .insert(VERSION_ID_QUERY.to_string(), version_id.to_string());
    }
}
