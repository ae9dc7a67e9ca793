// Test fixtures and data generators for integration tests

use chrono::{DateTime, TimeZone, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strongbox::s3::{EncryptionConfiguration, EncryptionRule, RetentionConfiguration, RetentionMode, SseAlgorithm};
use strongbox::TransportOutcome;

pub const BUCKET: &str = "records";
pub const OBJECT: &str = "2024/ledger.csv";

/// 2030-01-01T00:00:00Z
pub fn retain_until() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

/// Store error body in the S3 `<Error>` format.
pub fn error_body(code: &str, message: &str, resource: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>{}</Code><Message>{}</Message><Resource>{}</Resource><RequestId>1793E5C4A2B6D8F0</RequestId><HostId>dd9025bab4ad464b049177c95eb6ebf374d3b3fd1af9251148b658df7ac2e3e8</HostId></Error>"#,
        code, message, resource
    )
}

/// Error outcome with an `<Error>` body.
pub fn error_outcome(status: u16, code: &str, message: &str, resource: &str) -> TransportOutcome {
    TransportOutcome::new(status, error_body(code, message, resource))
        .with_header("content-type", "application/xml")
        .with_header("x-amz-request-id", "1793E5C4A2B6D8F0")
}

/// Retention document as returned by the store.
pub fn retention_body(mode: &str, until: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Retention xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Mode>{}</Mode><RetainUntilDate>{}</RetainUntilDate></Retention>"#,
        mode, until
    )
}

/// Encryption document as returned by the store.
pub fn kms_encryption_body(key_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ServerSideEncryptionConfiguration xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Rule>
    <ApplyServerSideEncryptionByDefault>
      <SSEAlgorithm>aws:kms</SSEAlgorithm>
      <KMSMasterKeyID>{}</KMSMasterKeyID>
    </ApplyServerSideEncryptionByDefault>
    <BucketKeyEnabled>true</BucketKeyEnabled>
  </Rule>
</ServerSideEncryptionConfiguration>"#,
        key_id
    )
}

/// Deterministic random configuration generator for reproducible tests
pub struct TestDataGenerator {
    rng: StdRng,
}

impl TestDataGenerator {
    /// Creates a new generator with a fixed seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates a random string of specified length
    pub fn random_string(&mut self, len: usize) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    /// Generates a random object key with one to three path segments
    pub fn random_object_name(&mut self) -> String {
        let segments = self.rng.gen_range(1..=3);
        (0..segments)
            .map(|_| {
                let len = self.rng.gen_range(1..12);
                self.random_string(len)
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Generates a random instant between 2025 and 2100, with millisecond precision
    pub fn random_instant(&mut self) -> DateTime<Utc> {
        let secs = self.rng.gen_range(1_735_689_600i64..4_102_444_800i64);
        let millis = self.rng.gen_range(0u32..1000);
        Utc.timestamp_opt(secs, millis * 1_000_000).unwrap()
    }

    /// Generates a random retention configuration
    pub fn random_retention(&mut self) -> RetentionConfiguration {
        let mode = match self.rng.gen_range(0..3) {
            0 => None,
            1 => Some(RetentionMode::Governance),
            _ => Some(RetentionMode::Compliance),
        };
        let until = if self.rng.gen_bool(0.8) {
            Some(self.random_instant())
        } else {
            None
        };
        RetentionConfiguration::new(mode, until)
    }

    /// Generates a random encryption configuration with up to two rules
    pub fn random_encryption(&mut self) -> EncryptionConfiguration {
        let mut config = EncryptionConfiguration::new();
        for _ in 0..self.rng.gen_range(0..=2) {
            let mut rule = if self.rng.gen_bool(0.5) {
                EncryptionRule::new(SseAlgorithm::Aes256, None)
            } else {
                let key = format!("arn:aws:kms:us-east-1:1234:key/{}", self.random_string(16));
                EncryptionRule::new(SseAlgorithm::AwsKms, Some(key))
            };
            if self.rng.gen_bool(0.3) {
                rule = rule.with_bucket_key(self.rng.gen_bool(0.5));
            }
            config = config.with_rule(rule);
        }
        config
    }
}
