//! S3 Object Lock retention for WORM (Write Once Read Many) compliance.
//!
//! A retention configuration prevents an object version from being deleted or
//! overwritten until a point in time. The lock itself is enforced by the store;
//! this module only models, validates and (de)serializes the configuration.
//!
//! ```text
//! NONE --set(GOVERNANCE)--> GOVERNANCE --set(COMPLIANCE)--> COMPLIANCE
//!   ^                            |
//!   +----set(NONE, bypass)-------+          COMPLIANCE has no way out
//! ```

use super::xml::{root_element, xml_escape};
use crate::error::{Result, StrongboxError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retention mode for object lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionMode {
    /// Privileged principals may shorten or remove the lock with an explicit bypass.
    Governance,
    /// No principal can shorten or remove the lock until it expires.
    Compliance,
}

impl RetentionMode {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionMode::Governance => "GOVERNANCE",
            RetentionMode::Compliance => "COMPLIANCE",
        }
    }
}

impl fmt::Display for RetentionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetentionMode {
    type Err = StrongboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GOVERNANCE" => Ok(RetentionMode::Governance),
            "COMPLIANCE" => Ok(RetentionMode::Compliance),
            other => Err(StrongboxError::InvalidRetentionMode(other.to_string())),
        }
    }
}

/// Object-level retention settings.
///
/// An unset mode means "no retention"; sending it removes a GOVERNANCE lock when the
/// request carries a governance bypass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfiguration {
    /// The retention mode.
    pub mode: Option<RetentionMode>,
    /// The instant until which the object version is retained.
    pub retain_until: Option<DateTime<Utc>>,
}

impl RetentionConfiguration {
    /// Create a configuration from already-validated parts.
    pub fn new(mode: Option<RetentionMode>, retain_until: Option<DateTime<Utc>>) -> Self {
        Self { mode, retain_until }
    }

    /// Create a configuration from a caller-supplied mode string.
    ///
    /// Fails with [`StrongboxError::InvalidRetentionMode`] unless the mode is exactly
    /// `GOVERNANCE` or `COMPLIANCE`.
    pub fn parse(mode: Option<&str>, retain_until: Option<DateTime<Utc>>) -> Result<Self> {
        let mode = mode.map(RetentionMode::from_str).transpose()?;
        Ok(Self::new(mode, retain_until))
    }

    /// The "no retention" configuration used for removal requests.
    pub fn none() -> Self {
        Self::default()
    }

    /// GOVERNANCE retention until the given instant.
    pub fn governance(retain_until: DateTime<Utc>) -> Self {
        Self::new(Some(RetentionMode::Governance), Some(retain_until))
    }

    /// COMPLIANCE retention until the given instant.
    pub fn compliance(retain_until: DateTime<Utc>) -> Self {
        Self::new(Some(RetentionMode::Compliance), Some(retain_until))
    }

    /// Check if this configuration clears the retention mode.
    pub fn is_removal(&self) -> bool {
        self.mode.is_none()
    }
}

/// Format a retain-until instant the way the store expects it.
pub fn format_retain_until(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Generate XML for object retention.
///
/// Unset fields are omitted from the document rather than emitted empty.
pub fn retention_to_xml(retention: &RetentionConfiguration) -> String {
    let mut xml = String::from("<Retention>");

    if let Some(mode) = retention.mode {
        xml.push_str(&format!("<Mode>{}</Mode>", mode));
    }
    if let Some(ref until) = retention.retain_until {
        xml.push_str(&format!(
            "<RetainUntilDate>{}</RetainUntilDate>",
            xml_escape(&format_retain_until(until))
        ));
    }

    xml.push_str("</Retention>");
    xml
}

/// Parse object retention from XML.
pub fn parse_retention_xml(xml: &str) -> Result<RetentionConfiguration> {
    let root = root_element(xml, "Retention")?;

    let mode = match root.child_token("Mode")? {
        Some(mode) if !mode.is_empty() => Some(mode.parse::<RetentionMode>().map_err(|_| {
            StrongboxError::Decode(format!("Invalid retention mode in document: {}", mode))
        })?),
        _ => None,
    };

    let retain_until = match root.child_token("RetainUntilDate")? {
        Some(date) => Some(
            DateTime::parse_from_rfc3339(&date)
                .map_err(|e| StrongboxError::Decode(format!("Invalid RetainUntilDate `{}`: {}", date, e)))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    Ok(RetentionConfiguration { mode, retain_until })
}
