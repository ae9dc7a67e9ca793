//! Configuration module for strongbox.

use crate::error::{Result, StrongboxError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the object store, e.g. `http://127.0.0.1:9000`.
    pub endpoint: String,
    /// Network configuration.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Name validation configuration.
    #[serde(default)]
    pub names: NamesConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000".to_string(),
            network: NetworkConfig::default(),
            names: NamesConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for the given endpoint with default settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StrongboxError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            StrongboxError::Config(format!("Failed to parse config: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint).map_err(|e| StrongboxError::InvalidConfig {
            field: "endpoint".to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(StrongboxError::InvalidConfig {
                field: "endpoint".to_string(),
                reason: format!("Unsupported scheme `{}`", url.scheme()),
            });
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(StrongboxError::InvalidConfig {
                field: "endpoint".to_string(),
                reason: "Endpoint must not carry a query or fragment".to_string(),
            });
        }

        if self.network.connect_timeout.is_zero() {
            return Err(StrongboxError::InvalidConfig {
                field: "network.connect_timeout".to_string(),
                reason: "Connect timeout must be non-zero".to_string(),
            });
        }

        if self.network.request_timeout.is_zero() {
            return Err(StrongboxError::InvalidConfig {
                field: "network.request_timeout".to_string(),
                reason: "Request timeout must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Create a configuration for a local development store.
    pub fn development() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000".to_string(),
            network: NetworkConfig {
                connect_timeout: Duration::from_secs(1),
                request_timeout: Duration::from_secs(5),
            },
            names: NamesConfig {
                strict_bucket_names: false,
            },
            observability: ObservabilityConfig {
                log_level: "debug".to_string(),
                json_logs: false,
            },
        }
    }
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Connection timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Name validation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamesConfig {
    /// Only accept DNS-compatible bucket names.
    #[serde(default)]
    pub strict_bucket_names: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Serde helper for Duration using humantime format.
pub mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Parse `"250ms"`, `"5s"`, `"2m"` or a bare millisecond count.
    pub fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let parse = |v: &str| v.trim().parse::<u64>().map_err(|e| format!("`{}`: {}", s, e));

        if let Some(ms) = s.strip_suffix("ms") {
            parse(ms).map(Duration::from_millis)
        } else if let Some(secs) = s.strip_suffix('s') {
            parse(secs).map(Duration::from_secs)
        } else if let Some(mins) = s.strip_suffix('m') {
            parse(mins).and_then(|v| {
                v.checked_mul(60)
                    .map(Duration::from_secs)
                    .ok_or_else(|| format!("`{}`: duration is too large", s))
            })
        } else {
            parse(s).map(Duration::from_millis)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.request_timeout, Duration::from_secs(30));
        assert!(!config.names.strict_bucket_names);
    }

    #[test]
    fn test_development_config() {
        let config = ClientConfig::development();
        assert!(config.validate().is_ok());
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_validate_endpoint() {
        let err = ClientConfig::new("ftp://store").validate().unwrap_err();
        assert!(matches!(err, StrongboxError::InvalidConfig { ref field, .. } if field == "endpoint"));

        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig::new("https://store.example.com/prefix").validate().is_ok());
    }

    #[test]
    fn test_validate_timeouts() {
        let mut config = ClientConfig::default();
        config.network.request_timeout = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, StrongboxError::InvalidConfig { ref field, .. } if field == "network.request_timeout")
        );
    }

    #[test]
    fn test_parse_duration() {
        use super::humantime_serde::parse_duration;
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1500").unwrap(), Duration::from_millis(1500));
        assert!(parse_duration("soon").is_err());

        let err = parse_duration(&format!("{}m", u64::MAX)).unwrap_err();
        assert!(err.contains("too large"));
        assert_eq!(
            parse_duration(&format!("{}m", u64::MAX / 60)).unwrap(),
            Duration::from_secs(u64::MAX / 60 * 60)
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "endpoint": "https://s3.example.com",
                "network": {{ "connect_timeout": "2s", "request_timeout": "10s" }},
                "names": {{ "strict_bucket_names": true }}
            }}"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint, "https://s3.example.com");
        assert_eq!(config.network.connect_timeout, Duration::from_secs(2));
        assert!(config.names.strict_bucket_names);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "endpoint": "gopher://old" }}"#).unwrap();
        assert!(ClientConfig::from_file(file.path()).is_err());

        let missing = std::path::Path::new("/nonexistent/strongbox.json");
        assert!(matches!(
            ClientConfig::from_file(missing),
            Err(StrongboxError::Config(_))
        ));
    }
}
