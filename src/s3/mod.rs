//! S3 object retention and bucket default encryption.
//!
//! This module holds the wire-level pieces of the client: configuration models and
//! their XML codecs, name validation, body digests, the request builder and the
//! response interpreter. Nothing here performs I/O.

mod checksum;
mod encryption;
mod names;
mod request;
mod response;
mod retention;
pub mod xml;

pub use checksum::{Digester, StandardDigester, EMPTY_SHA256_HEX};
pub use encryption::{
    encryption_to_xml, parse_encryption_xml, BucketEncryption, DefaultEncryption,
    EncryptionConfiguration, EncryptionRule, SseAlgorithm,
};
pub use names::{NameValidator, S3NameValidator};
pub use request::{
    Operation, RequestBuilder, RequestDescriptor, SetRetentionOptions, BYPASS_GOVERNANCE_HEADER,
    CONTENT_MD5_HEADER, CONTENT_SHA256_HEADER, ENCRYPTION_QUERY, RETENTION_QUERY,
    VERSION_ID_QUERY,
};
pub use response::{
    check_status, interpret_encryption, interpret_retention, service_error, HOST_ID_HEADER,
    REQUEST_ID_HEADER,
};
pub use retention::{
    format_retain_until, parse_retention_xml, retention_to_xml, RetentionConfiguration,
    RetentionMode,
};
