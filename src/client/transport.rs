//! Transport seam between the client and the object store.

use crate::cancel::CancellationToken;
use crate::error::{Result, StrongboxError};
use crate::s3::{RequestDescriptor, CONTENT_MD5_HEADER, CONTENT_SHA256_HEADER};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::trace;

/// Default connection timeout for store requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout for store requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw response of an executed request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOutcome {
    /// HTTP status code.
    pub status: u16,
    /// Response headers with lower-case names.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl TransportOutcome {
    /// Create an outcome with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Add a response header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes request descriptors against an object store.
///
/// Implementations perform exactly one attempt per call; signing, retries and
/// redirects are out of their scope.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request, returning the raw response.
    ///
    /// Any status code is a successful execution; only failures to obtain a response
    /// are errors. Implementations should stop early once `cancel` fires.
    async fn execute(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<TransportOutcome>;
}

/// HTTP transport using path-style addressing (`{endpoint}/{bucket}/{object}`).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    client: Client,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with default timeouts.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeouts(endpoint, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with custom timeouts.
    pub fn with_timeouts(
        endpoint: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StrongboxError::Config(format!("Invalid endpoint `{}`: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(StrongboxError::Config(format!(
                "Endpoint `{}` cannot carry a path",
                endpoint
            )));
        }

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| StrongboxError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            client,
            request_timeout,
        })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve the URL of a request.
    ///
    /// Keys with `.` or `..` segments are rejected: URL normalization would
    /// resolve them (even when percent-encoded) and address a different object.
    pub fn url_for(&self, request: &RequestDescriptor) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StrongboxError::Internal("Endpoint cannot carry a path".into()))?;
            segments.pop_if_empty().push(&request.bucket);
            if let Some(ref object) = request.object {
                // Keys keep their `/` separators; each part is percent-encoded on its own.
                for part in object.split('/') {
                    if is_dot_segment(part) {
                        return Err(StrongboxError::InvalidObjectName(format!(
                            "`{}` has a `{}` segment that path-style URLs cannot address",
                            object, part
                        )));
                    }
                    segments.push(part);
                }
            }
        }

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                if value.is_empty() {
                    pairs.append_key_only(name);
                } else {
                    pairs.append_pair(name, value);
                }
            }
        }

        Ok(url)
    }

    fn map_error(&self, e: reqwest::Error) -> StrongboxError {
        if e.is_timeout() {
            StrongboxError::Timeout(self.request_timeout.as_millis() as u64)
        } else {
            StrongboxError::Transport(e.to_string())
        }
    }
}

fn is_dot_segment(part: &str) -> bool {
    matches!(
        part.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
    )
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<TransportOutcome> {
        let url = self.url_for(request)?;
        trace!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(CONTENT_SHA256_HEADER, &request.content_sha256);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref md5) = request.content_md5 {
            builder = builder.header(CONTENT_MD5_HEADER, md5.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/xml")
                .body(body.clone());
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StrongboxError::Cancelled),
            response = builder.send() => response.map_err(|e| self.map_error(e))?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StrongboxError::Cancelled),
            body = response.bytes() => body.map_err(|e| self.map_error(e))?,
        };

        Ok(TransportOutcome {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::{RequestBuilder, SetRetentionOptions};
    use crate::s3::RetentionConfiguration;

    #[test]
    fn test_outcome_headers_case_insensitive() {
        let outcome = TransportOutcome::new(200, "").with_header("X-Amz-Request-Id", "abc");
        assert_eq!(outcome.header("x-amz-request-id"), Some("abc"));
        assert_eq!(outcome.header("X-AMZ-REQUEST-ID"), Some("abc"));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(StrongboxError::Config(_))
        ));
        assert!(matches!(
            HttpTransport::new("mailto:ops@example.com"),
            Err(StrongboxError::Config(_))
        ));
    }

    #[test]
    fn test_url_for_bucket_subresource() {
        let transport = HttpTransport::new("http://127.0.0.1:9000/").unwrap();
        let request = RequestBuilder::default().get_encryption("photos").unwrap();
        let url = transport.url_for(&request).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/photos?encryption");
    }

    #[test]
    fn test_url_for_object_with_version() {
        let transport = HttpTransport::new("http://127.0.0.1:9000").unwrap();
        let opts = SetRetentionOptions::new(RetentionConfiguration::none()).version_id("v 1");
        let request = RequestBuilder::default()
            .set_retention("photos", "2024/cat pic.jpg", &opts)
            .unwrap();
        let url = transport.url_for(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/photos/2024/cat%20pic.jpg?retention&versionId=v+1"
        );
    }

    #[test]
    fn test_url_for_rejects_dot_segments() {
        let transport = HttpTransport::new("http://127.0.0.1:9000").unwrap();
        let builder = RequestBuilder::default();
        let opts = SetRetentionOptions::new(RetentionConfiguration::none());

        for key in ["locked/../victim.csv", "./ledger.csv", "a/./b", "a/../b", "..", "a/%2E%2E/b"] {
            let request = builder.set_retention("records", key, &opts).unwrap();
            let err = transport.url_for(&request).unwrap_err();
            assert!(
                matches!(err, StrongboxError::InvalidObjectName(_)),
                "{} resolved to {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_url_for_keeps_dotted_names() {
        let transport = HttpTransport::new("http://127.0.0.1:9000").unwrap();
        let request = RequestBuilder::default()
            .get_retention("records", ".hidden/...//v1..csv", None)
            .unwrap();
        let url = transport.url_for(&request).unwrap();
        assert_eq!(url.path(), "/records/.hidden/...//v1..csv");
    }

    #[tokio::test]
    async fn test_dot_segment_key_never_sent() {
        let transport = HttpTransport::new("http://127.0.0.1:9").unwrap();
        let opts = SetRetentionOptions::new(RetentionConfiguration::none());
        let request = RequestBuilder::default()
            .set_retention("records", "locked/../victim.csv", &opts)
            .unwrap();

        let err = transport
            .execute(&request, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        // Port 9 (discard) is never expected to answer; cancellation wins regardless.
        let transport = HttpTransport::new("http://127.0.0.1:9").unwrap();
        let request = RequestBuilder::default().get_encryption("photos").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = transport.execute(&request, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
