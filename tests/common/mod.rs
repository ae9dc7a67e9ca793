//! Common test utilities for integration tests.

pub mod assertions;
pub mod fixtures;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strongbox::{
    CancellationToken, ConfigClient, Result, StrongboxError, Transport, TransportOutcome,
};
use strongbox::s3::{Digester, NameValidator, RequestDescriptor};

// Re-export common types
pub use assertions::*;
pub use fixtures::*;

/// Scripted reply of the mock transport.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this outcome.
    Outcome(TransportOutcome),
    /// Fail with a transport error.
    Fail(String),
    /// Never answer.
    Hang,
}

/// In-memory transport replaying scripted replies and recording requests.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<RequestDescriptor>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Transport that answers every call with the given outcome, once.
    pub fn replying(outcome: TransportOutcome) -> Arc<Self> {
        let transport = Self::new();
        transport.push(Reply::Outcome(outcome));
        transport
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RequestDescriptor {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(
        &self,
        request: &RequestDescriptor,
        _cancel: &CancellationToken,
    ) -> Result<TransportOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Outcome(outcome)) => Ok(outcome),
            Some(Reply::Fail(message)) => Err(StrongboxError::Transport(message)),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(StrongboxError::Transport("hung transport woke up".into()))
            }
            None => Err(StrongboxError::Transport("no scripted reply".into())),
        }
    }
}

/// Client over a mock transport.
pub fn mock_client(transport: &Arc<MockTransport>) -> ConfigClient {
    ConfigClient::new(transport.clone())
}

/// Name rules that accept every bucket and object name.
#[derive(Debug, Default)]
pub struct PermissiveNames;

impl NameValidator for PermissiveNames {
    fn validate_bucket_name(&self, _bucket: &str) -> Result<()> {
        Ok(())
    }

    fn validate_object_name(&self, _object: &str) -> Result<()> {
        Ok(())
    }
}

pub const FIXED_MD5: &str = "md5-fixed";
pub const FIXED_SHA256: &str = "sha256-fixed";

/// Digester returning constant digests, so requests can be compared exactly.
#[derive(Debug, Default)]
pub struct FixedDigester;

impl Digester for FixedDigester {
    fn content_md5(&self, _body: &[u8]) -> String {
        FIXED_MD5.to_string()
    }

    fn content_sha256(&self, _body: &[u8]) -> String {
        FIXED_SHA256.to_string()
    }
}

/// Client over a mock transport with permissive names and fixed digests.
pub fn permissive_client(transport: &Arc<MockTransport>) -> ConfigClient {
    ConfigClient::with_collaborators(
        transport.clone(),
        Arc::new(PermissiveNames),
        Arc::new(FixedDigester),
    )
}
