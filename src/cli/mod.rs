//! Command-line interface for strongbox.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::s3::SseAlgorithm;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// strongbox - manage object retention and bucket default encryption.
#[derive(Parser, Debug)]
#[command(name = "strongbox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STRONGBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Object store endpoint (overrides the configuration file)
    #[arg(short, long, env = "STRONGBOX_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STRONGBOX_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Object retention commands
    Retention {
        #[command(subcommand)]
        command: RetentionCommands,
    },

    /// Bucket default encryption commands
    Encryption {
        #[command(subcommand)]
        command: EncryptionCommands,
    },
}

/// Object retention subcommands.
#[derive(Subcommand, Debug)]
pub enum RetentionCommands {
    /// Set or clear the retention of an object
    Set {
        /// Bucket name
        bucket: String,

        /// Object name
        object: String,

        /// Retention mode (GOVERNANCE or COMPLIANCE); omit to clear
        #[arg(short, long)]
        mode: Option<String>,

        /// Retain until (RFC 3339, e.g. 2030-01-01T00:00:00Z)
        #[arg(short, long)]
        retain_until: Option<DateTime<Utc>>,

        /// Object version
        #[arg(long)]
        version_id: Option<String>,

        /// Bypass GOVERNANCE retention
        #[arg(long)]
        bypass_governance: bool,
    },

    /// Show the retention of an object
    Get {
        /// Bucket name
        bucket: String,

        /// Object name
        object: String,

        /// Object version
        #[arg(long)]
        version_id: Option<String>,
    },
}

/// Bucket default encryption subcommands.
#[derive(Subcommand, Debug)]
pub enum EncryptionCommands {
    /// Set the default encryption of a bucket
    Set {
        /// Bucket name
        bucket: String,

        /// Algorithm (AES256 or aws:kms)
        #[arg(short, long, default_value = "AES256", value_parser = parse_algorithm)]
        algorithm: SseAlgorithm,

        /// KMS key for aws:kms
        #[arg(short, long)]
        kms_key_id: Option<String>,

        /// Enable S3 Bucket Keys
        #[arg(long)]
        bucket_key: bool,
    },

    /// Show the default encryption of a bucket
    Get {
        /// Bucket name
        bucket: String,
    },

    /// Remove the default encryption of a bucket
    Remove {
        /// Bucket name
        bucket: String,
    },
}

fn parse_algorithm(s: &str) -> std::result::Result<SseAlgorithm, String> {
    SseAlgorithm::parse(s).ok_or_else(|| format!("unsupported algorithm `{}`", s))
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve the client configuration from the file and the overrides.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match self.config {
            Some(ref path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ref level) = self.log_level {
            config.observability.log_level = level.clone();
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_retention_set() {
        let cli = Cli::try_parse_from([
            "strongbox",
            "--endpoint",
            "http://localhost:9000",
            "retention",
            "set",
            "photos",
            "cat.jpg",
            "--mode",
            "GOVERNANCE",
            "--retain-until",
            "2030-01-01T00:00:00Z",
            "--bypass-governance",
        ])
        .unwrap();

        match cli.command {
            Commands::Retention {
                command:
                    RetentionCommands::Set {
                        ref mode,
                        retain_until,
                        bypass_governance,
                        ..
                    },
            } => {
                assert_eq!(mode.as_deref(), Some("GOVERNANCE"));
                assert!(retain_until.is_some());
                assert!(bypass_governance);
            }
            ref other => panic!("unexpected command {:?}", other),
        }

        assert_eq!(cli.client_config().unwrap().endpoint, "http://localhost:9000");
    }

    #[test]
    fn test_parse_encryption_algorithm() {
        let cli = Cli::try_parse_from([
            "strongbox", "encryption", "set", "photos", "--algorithm", "aws:kms", "--kms-key-id", "k1",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Encryption {
                command: EncryptionCommands::Set {
                    algorithm: SseAlgorithm::AwsKms,
                    ..
                }
            }
        ));

        assert!(Cli::try_parse_from(["strongbox", "encryption", "set", "photos", "--algorithm", "des"]).is_err());
    }
}
