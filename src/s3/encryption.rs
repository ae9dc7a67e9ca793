//! S3 bucket default server-side encryption (SSE) configuration.
//!
//! The default encryption configuration makes the store encrypt newly written
//! objects with the given algorithm when the upload does not ask for one itself.

use super::xml::{root_element, xml_escape, XmlElement, XmlParseError, S3_NAMESPACE};
use crate::error::{Result, ServiceError, SSE_CONFIGURATION_NOT_FOUND};
use serde::{Deserialize, Serialize};

/// Server-side encryption configuration for a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionConfiguration {
    /// Default encryption rules. The store accepts a single rule in practice.
    pub rules: Vec<EncryptionRule>,
}

impl EncryptionConfiguration {
    /// Create an empty encryption configuration.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a configuration with SSE-S3 (AES256) default encryption.
    pub fn with_sse_s3() -> Self {
        Self {
            rules: vec![EncryptionRule::new(SseAlgorithm::Aes256, None)],
        }
    }

    /// Create a configuration with SSE-KMS default encryption.
    pub fn with_sse_kms(key_id: impl Into<String>) -> Self {
        Self {
            rules: vec![EncryptionRule::new(SseAlgorithm::AwsKms, Some(key_id.into()))],
        }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: EncryptionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Get the default SSE algorithm.
    pub fn default_algorithm(&self) -> Option<SseAlgorithm> {
        self.rules
            .first()
            .map(|r| r.apply_server_side_encryption_by_default.sse_algorithm)
    }

    /// Get the KMS key of the default rule, if any.
    pub fn kms_master_key_id(&self) -> Option<&str> {
        self.rules
            .first()
            .and_then(|r| r.apply_server_side_encryption_by_default.kms_master_key_id.as_deref())
    }

    /// Check if bucket key is enabled.
    pub fn bucket_key_enabled(&self) -> bool {
        self.rules
            .first()
            .and_then(|r| r.bucket_key_enabled)
            .unwrap_or(false)
    }
}

/// A single encryption rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionRule {
    /// Default encryption settings.
    pub apply_server_side_encryption_by_default: DefaultEncryption,
    /// Whether to use an S3 bucket key for SSE-KMS.
    pub bucket_key_enabled: Option<bool>,
}

impl EncryptionRule {
    /// Create a rule with the given algorithm and optional KMS key.
    pub fn new(sse_algorithm: SseAlgorithm, kms_master_key_id: Option<String>) -> Self {
        Self {
            apply_server_side_encryption_by_default: DefaultEncryption {
                sse_algorithm,
                kms_master_key_id,
            },
            bucket_key_enabled: None,
        }
    }

    /// Set the bucket key flag.
    pub fn with_bucket_key(mut self, enabled: bool) -> Self {
        self.bucket_key_enabled = Some(enabled);
        self
    }
}

/// Default encryption settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultEncryption {
    /// SSE algorithm (AES256 or aws:kms).
    pub sse_algorithm: SseAlgorithm,
    /// KMS master key ID (only meaningful for SSE-KMS).
    pub kms_master_key_id: Option<String>,
}

/// Server-side encryption algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SseAlgorithm {
    /// AES-256 encryption (SSE-S3).
    #[serde(rename = "AES256")]
    Aes256,
    /// KMS encryption (SSE-KMS).
    #[serde(rename = "aws:kms")]
    AwsKms,
}

impl SseAlgorithm {
    /// Parse from the wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AES256" => Some(Self::Aes256),
            "aws:kms" => Some(Self::AwsKms),
            _ => None,
        }
    }

    /// Convert to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256 => "AES256",
            Self::AwsKms => "aws:kms",
        }
    }
}

impl std::fmt::Display for SseAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of looking up a bucket's default encryption.
///
/// A bucket without default encryption is a normal state, not a failure. The store
/// reports it with a dedicated error code, which is kept in
/// [`BucketEncryption::NotConfigured`] for callers that want it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketEncryption {
    /// The bucket has a default encryption configuration.
    Configured(EncryptionConfiguration),
    /// The store reported that no default encryption is configured.
    NotConfigured(ServiceError),
}

impl BucketEncryption {
    /// Split the result of a GET into configured / not configured / failed.
    pub fn from_result(result: Result<EncryptionConfiguration>) -> Result<Self> {
        match result {
            Ok(config) => Ok(BucketEncryption::Configured(config)),
            Err(crate::error::StrongboxError::Service(e)) if e.code == SSE_CONFIGURATION_NOT_FOUND => {
                Ok(BucketEncryption::NotConfigured(e))
            }
            Err(e) => Err(e),
        }
    }

    /// The configuration, if present.
    pub fn configuration(&self) -> Option<&EncryptionConfiguration> {
        match self {
            BucketEncryption::Configured(config) => Some(config),
            BucketEncryption::NotConfigured(_) => None,
        }
    }

    /// Check if default encryption is configured.
    pub fn is_configured(&self) -> bool {
        matches!(self, BucketEncryption::Configured(_))
    }
}

/// Generate XML for encryption configuration.
pub fn encryption_to_xml(config: &EncryptionConfiguration) -> String {
    let mut xml = format!(
        "<ServerSideEncryptionConfiguration xmlns=\"{}\">",
        S3_NAMESPACE
    );

    for rule in &config.rules {
        let default = &rule.apply_server_side_encryption_by_default;
        xml.push_str("<Rule><ApplyServerSideEncryptionByDefault>");
        xml.push_str(&format!(
            "<SSEAlgorithm>{}</SSEAlgorithm>",
            xml_escape(default.sse_algorithm.as_str())
        ));
        if let Some(ref key_id) = default.kms_master_key_id {
            xml.push_str(&format!(
                "<KMSMasterKeyID>{}</KMSMasterKeyID>",
                xml_escape(key_id)
            ));
        }
        xml.push_str("</ApplyServerSideEncryptionByDefault>");

        if let Some(enabled) = rule.bucket_key_enabled {
            xml.push_str(&format!("<BucketKeyEnabled>{}</BucketKeyEnabled>", enabled));
        }

        xml.push_str("</Rule>");
    }

    xml.push_str("</ServerSideEncryptionConfiguration>");
    xml
}

/// Parse encryption configuration from XML.
pub fn parse_encryption_xml(xml: &str) -> Result<EncryptionConfiguration> {
    // Format:
    // <ServerSideEncryptionConfiguration>
    //   <Rule>
    //     <ApplyServerSideEncryptionByDefault>
    //       <SSEAlgorithm>AES256|aws:kms</SSEAlgorithm>
    //       <KMSMasterKeyID>key-id</KMSMasterKeyID>
    //     </ApplyServerSideEncryptionByDefault>
    //     <BucketKeyEnabled>true|false</BucketKeyEnabled>
    //   </Rule>
    // </ServerSideEncryptionConfiguration>

    let root = root_element(xml, "ServerSideEncryptionConfiguration")?;

    let rules = root
        .children_named("Rule")?
        .iter()
        .map(parse_encryption_rule)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(EncryptionConfiguration { rules })
}

/// Parse a single encryption rule element.
fn parse_encryption_rule(rule: &XmlElement<'_>) -> std::result::Result<EncryptionRule, XmlParseError> {
    let default = rule
        .child("ApplyServerSideEncryptionByDefault")?
        .ok_or_else(|| XmlParseError::MissingField("ApplyServerSideEncryptionByDefault".to_string()))?;

    let algorithm = default
        .child_token("SSEAlgorithm")?
        .ok_or_else(|| XmlParseError::MissingField("SSEAlgorithm".to_string()))?;
    let sse_algorithm = SseAlgorithm::parse(&algorithm).ok_or_else(|| XmlParseError::InvalidValue {
        field: "SSEAlgorithm".to_string(),
        reason: format!("unsupported algorithm `{}`", algorithm),
    })?;

    // For SSE-KMS the key is optional; the store falls back to its default key.
    // A present key is kept verbatim, even when empty.
    let kms_master_key_id = default.child_text("KMSMasterKeyID")?;

    let bucket_key_enabled = match rule.child_token("BucketKeyEnabled")? {
        Some(flag) => Some(parse_bool("BucketKeyEnabled", &flag)?),
        None => None,
    };

    Ok(EncryptionRule {
        apply_server_side_encryption_by_default: DefaultEncryption {
            sse_algorithm,
            kms_master_key_id,
        },
        bucket_key_enabled,
    })
}

fn parse_bool(field: &str, value: &str) -> std::result::Result<bool, XmlParseError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(XmlParseError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected true or false, got `{}`", value),
        }),
    }
}
