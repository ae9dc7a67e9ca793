//! Observability module for strongbox.
//!
//! Provides logging setup and the request counters. The library only records
//! metrics through the `metrics` facade; installing an exporter is up to the
//! embedding application.

use crate::config::ObservabilityConfig;
use crate::error::{Result, StrongboxError};
use crate::s3::Operation;
use metrics::counter;
use ::tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| StrongboxError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| StrongboxError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}

/// Record a response received from the store.
pub fn record_request(operation: Operation, status: u16) {
    counter!(
        "strongbox_requests_total",
        "operation" => operation.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record an operation that ended in an error.
pub fn record_failure(operation: Operation, error: &StrongboxError) {
    counter!(
        "strongbox_request_failures_total",
        "operation" => operation.as_str(),
        "kind" => error.kind()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder() {
        // With no recorder installed these are no-ops.
        record_request(Operation::GetEncryption, 200);
        record_failure(Operation::SetRetention, &StrongboxError::Cancelled);
    }

    #[test]
    fn test_init_twice_fails() {
        let config = ObservabilityConfig::default();
        let first = init(&config);
        let second = init(&config);
        // Another test may already have installed a global subscriber.
        assert!(first.is_err() || second.is_err());
    }
}
