// Custom test assertions for integration tests

use strongbox::s3::{RequestDescriptor, EMPTY_SHA256_HEX};
use strongbox::{ServiceError, StrongboxError};

/// Asserts that the error is a service error and returns it.
pub fn expect_service_error(err: StrongboxError) -> ServiceError {
    match err {
        StrongboxError::Service(e) => e,
        other => panic!("expected a service error, got {:?}", other),
    }
}

/// Asserts that the request carries no body and the empty-payload digest.
pub fn assert_bodyless(request: &RequestDescriptor) {
    assert!(
        request.body.is_none(),
        "expected no body, got {:?}",
        request.body_text()
    );
    assert_eq!(request.content_length, 0);
    assert!(request.content_md5.is_none());
    assert_eq!(request.content_sha256, EMPTY_SHA256_HEX);
}

/// Asserts that the request body and its declared length agree.
pub fn assert_body(request: &RequestDescriptor, expected: &str) {
    let body = request.body_text().expect("request has a UTF-8 body");
    assert_eq!(body, expected);
    assert_eq!(request.content_length, expected.len() as u64);
    assert!(request.content_md5.is_some(), "Content-MD5 missing");
    assert_ne!(request.content_sha256, EMPTY_SHA256_HEX);
}
