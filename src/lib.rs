//! strongbox - object retention and bucket default encryption for S3-compatible stores.
//!
//! strongbox manages two pieces of object-store metadata with legally relevant
//! semantics: per-object **retention locks** (WORM holds) and per-bucket **default
//! server-side encryption**. Configurations are validated before they are encoded,
//! and "not configured" is kept distinct from real failures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ConfigClient: set/get retention, set/get/remove encryption │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RequestBuilder ──> Transport ──> Response interpreter      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Models + XML codecs | Name validation | Body digests       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::{TimeZone, Utc};
//! use strongbox::config::ClientConfig;
//! use strongbox::s3::{RetentionConfiguration, SetRetentionOptions};
//! use strongbox::{CancellationToken, ConfigClient};
//!
//! #[tokio::main]
//! async fn main() -> strongbox::Result<()> {
//!     let client = ConfigClient::from_config(&ClientConfig::development())?;
//!     let cancel = CancellationToken::new();
//!
//!     let until = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
//!     let opts = SetRetentionOptions::new(RetentionConfiguration::governance(until));
//!     client.set_object_retention("records", "2024/ledger.csv", &opts, &cancel).await?;
//!
//!     let status = client.bucket_encryption_status("records", &cancel).await?;
//!     println!("default encryption configured: {}", status.is_configured());
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod s3;

pub use cancel::CancellationToken;
pub use client::{ConfigClient, HttpTransport, Transport, TransportOutcome};
pub use error::{Result, ServiceError, StrongboxError};
pub use s3::{
    BucketEncryption, EncryptionConfiguration, RetentionConfiguration, RetentionMode,
    SetRetentionOptions, SseAlgorithm,
};
