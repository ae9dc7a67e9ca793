//! strongbox CLI - Main entry point.

use strongbox::cli::{Cli, Commands, EncryptionCommands, RetentionCommands};
use strongbox::s3::{EncryptionConfiguration, EncryptionRule, RetentionConfiguration, SetRetentionOptions};
use strongbox::{BucketEncryption, CancellationToken, ConfigClient};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let config = cli.client_config()?;
    strongbox::observability::init(&config.observability)?;

    let client = ConfigClient::from_config(&config)?;
    let cancel = CancellationToken::new();

    // Ctrl-C cancels the in-flight request.
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C");
            signal_token.cancel();
        }
    });

    match cli.command {
        Commands::Retention { command } => match command {
            RetentionCommands::Set {
                bucket,
                object,
                mode,
                retain_until,
                version_id,
                bypass_governance,
            } => {
                let retention = RetentionConfiguration::parse(mode.as_deref(), retain_until)?;
                let mut opts = SetRetentionOptions::new(retention).governance_bypass(bypass_governance);
                if let Some(version_id) = version_id {
                    opts = opts.version_id(version_id);
                }

                client.set_object_retention(&bucket, &object, &opts, &cancel).await?;
                println!("Retention updated for {}/{}", bucket, object);
            }
            RetentionCommands::Get {
                bucket,
                object,
                version_id,
            } => {
                let retention = client
                    .get_object_retention(&bucket, &object, version_id.as_deref(), &cancel)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&retention)?);
            }
        },

        Commands::Encryption { command } => match command {
            EncryptionCommands::Set {
                bucket,
                algorithm,
                kms_key_id,
                bucket_key,
            } => {
                let mut rule = EncryptionRule::new(algorithm, kms_key_id);
                if bucket_key {
                    rule = rule.with_bucket_key(true);
                }
                let encryption = EncryptionConfiguration::new().with_rule(rule);

                client
                    .set_bucket_encryption(&bucket, Some(&encryption), &cancel)
                    .await?;
                println!("Default encryption set for {}", bucket);
            }
            EncryptionCommands::Get { bucket } => {
                match client.bucket_encryption_status(&bucket, &cancel).await? {
                    BucketEncryption::Configured(encryption) => {
                        println!("{}", serde_json::to_string_pretty(&encryption)?);
                    }
                    BucketEncryption::NotConfigured(_) => {
                        println!("No default encryption configured for {}", bucket);
                    }
                }
            }
            EncryptionCommands::Remove { bucket } => {
                client.remove_bucket_encryption(&bucket, &cancel).await?;
                println!("Default encryption removed from {}", bucket);
            }
        },
    }

    Ok(())
}
