//! Client for object retention and bucket default encryption.
//!
//! [`ConfigClient`] ties the request builder, a [`Transport`] and the response
//! interpreter together. Every operation performs exactly one transport call (or
//! none, when validation fails or the token is already cancelled).

mod transport;

pub use transport::{
    HttpTransport, Transport, TransportOutcome, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
};

use crate::cancel::CancellationToken;
use crate::config::ClientConfig;
use crate::error::{Result, StrongboxError};
use crate::observability::{record_failure, record_request};
use crate::s3::{
    check_status, interpret_encryption, interpret_retention, BucketEncryption, Digester,
    EncryptionConfiguration, NameValidator, Operation, RequestBuilder, RequestDescriptor,
    RetentionConfiguration, S3NameValidator, SetRetentionOptions, StandardDigester,
    VERSION_ID_QUERY,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Client for the retention and encryption configuration resources.
#[derive(Clone)]
pub struct ConfigClient {
    transport: Arc<dyn Transport>,
    builder: RequestBuilder,
}

impl fmt::Debug for ConfigClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigClient")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl ConfigClient {
    /// Create a client with the default name rules and digests.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            builder: RequestBuilder::default(),
        }
    }

    /// Create a client with custom collaborators.
    pub fn with_collaborators(
        transport: Arc<dyn Transport>,
        names: Arc<dyn NameValidator>,
        digester: Arc<dyn Digester>,
    ) -> Self {
        Self {
            transport,
            builder: RequestBuilder::new(names, digester),
        }
    }

    /// Create an HTTP client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let transport = HttpTransport::with_timeouts(
            &config.endpoint,
            config.network.connect_timeout,
            config.network.request_timeout,
        )?;
        let names = if config.names.strict_bucket_names {
            S3NameValidator::strict()
        } else {
            S3NameValidator::new()
        };

        Ok(Self::with_collaborators(
            Arc::new(transport),
            Arc::new(names),
            Arc::new(StandardDigester),
        ))
    }

    /// The request builder used by this client.
    pub fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Set (or, with an unset mode, remove) the retention of an object version.
    ///
    /// Removing or shortening a GOVERNANCE lock requires `opts.governance_bypass`.
    pub async fn set_object_retention(
        &self,
        bucket: &str,
        object: &str,
        opts: &SetRetentionOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let result = async {
            let request = self.builder.set_retention(bucket, object, opts)?;
            let outcome = self.dispatch(&request, cancel).await?;
            check_status(Operation::SetRetention, &outcome, bucket, Some(object))
        }
        .await;
        observed(Operation::SetRetention, result)
    }

    /// Get the retention of an object version.
    ///
    /// An object without retention yields a service error with code
    /// `NoSuchObjectLockConfiguration`.
    pub async fn get_object_retention(
        &self,
        bucket: &str,
        object: &str,
        version_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<RetentionConfiguration> {
        let result = async {
            let request = self.builder.get_retention(bucket, object, version_id)?;
            let outcome = self.dispatch(&request, cancel).await?;
            interpret_retention(&outcome, bucket, object)
        }
        .await;
        observed(Operation::GetRetention, result)
    }

    /// Set the default encryption of a bucket.
    pub async fn set_bucket_encryption(
        &self,
        bucket: &str,
        config: Option<&EncryptionConfiguration>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let result = async {
            let request = self.builder.set_encryption(bucket, config)?;
            let outcome = self.dispatch(&request, cancel).await?;
            check_status(Operation::SetEncryption, &outcome, bucket, None)
        }
        .await;
        observed(Operation::SetEncryption, result)
    }

    /// Get the default encryption of a bucket.
    pub async fn get_bucket_encryption(
        &self,
        bucket: &str,
        cancel: &CancellationToken,
    ) -> Result<EncryptionConfiguration> {
        let result = self.fetch_bucket_encryption(bucket, cancel).await;
        observed(Operation::GetEncryption, result)
    }

    /// Get the default encryption of a bucket, treating "not configured" as a value.
    pub async fn bucket_encryption_status(
        &self,
        bucket: &str,
        cancel: &CancellationToken,
    ) -> Result<BucketEncryption> {
        let result = BucketEncryption::from_result(self.fetch_bucket_encryption(bucket, cancel).await);
        observed(Operation::GetEncryption, result)
    }

    /// Remove the default encryption of a bucket.
    pub async fn remove_bucket_encryption(
        &self,
        bucket: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let result = async {
            let request = self.builder.remove_encryption(bucket)?;
            let outcome = self.dispatch(&request, cancel).await?;
            check_status(Operation::RemoveEncryption, &outcome, bucket, None)
        }
        .await;
        observed(Operation::RemoveEncryption, result)
    }

    async fn fetch_bucket_encryption(
        &self,
        bucket: &str,
        cancel: &CancellationToken,
    ) -> Result<EncryptionConfiguration> {
        let request = self.builder.get_encryption(bucket)?;
        let outcome = self.dispatch(&request, cancel).await?;
        interpret_encryption(&outcome, bucket)
    }

    async fn dispatch(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<TransportOutcome> {
        if cancel.is_cancelled() {
            return Err(StrongboxError::Cancelled);
        }

        debug!(
            operation = %request.operation,
            bucket = %request.bucket,
            object = ?request.object,
            version_id = ?request.query_param(VERSION_ID_QUERY),
            "Dispatching request"
        );

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StrongboxError::Cancelled),
            outcome = self.transport.execute(request, cancel) => outcome?,
        };

        debug!(
            operation = %request.operation,
            bucket = %request.bucket,
            status = outcome.status,
            "Received response"
        );
        record_request(request.operation, outcome.status);
        Ok(outcome)
    }
}

fn observed<T>(operation: Operation, result: Result<T>) -> Result<T> {
    if let Err(ref e) = result {
        record_failure(operation, e);
    }
    result
}
