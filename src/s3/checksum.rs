//! Content-integrity digests for request bodies.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the empty payload, sent when a request has no body.
pub const EMPTY_SHA256_HEX: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Digest algorithms applied to encoded configuration documents.
pub trait Digester: Send + Sync {
    /// Base64-encoded MD5, as carried by `Content-MD5`.
    fn content_md5(&self, bytes: &[u8]) -> String;

    /// Hex-encoded SHA-256, as carried by `x-amz-content-sha256`.
    fn content_sha256(&self, bytes: &[u8]) -> String;
}

/// MD5 + SHA-256 digester.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDigester;

impl Digester for StandardDigester {
    fn content_md5(&self, bytes: &[u8]) -> String {
        STANDARD.encode(md5::compute(bytes).0)
    }

    fn content_sha256(&self, bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }
}
