//! Interpretation of store responses.
//!
//! Success is decided by status code alone: each [`Operation`] has a fixed set of
//! success statuses, and anything else becomes a [`ServiceError`] built from the
//! response body (or, when the body carries no error document, from the status).

use super::encryption::{parse_encryption_xml, EncryptionConfiguration};
use super::request::Operation;
use super::retention::{parse_retention_xml, RetentionConfiguration};
use super::xml::parse_error_document;
use crate::client::TransportOutcome;
use crate::error::{Result, ServiceError, StrongboxError};

/// Header carrying the store's request ID.
pub const REQUEST_ID_HEADER: &str = "x-amz-request-id";
/// Header carrying the store's host ID.
pub const HOST_ID_HEADER: &str = "x-amz-id-2";

/// Accept the outcome if its status is a success status for the operation.
pub fn check_status(
    operation: Operation,
    outcome: &TransportOutcome,
    bucket: &str,
    object: Option<&str>,
) -> Result<()> {
    if operation.success_statuses().contains(&outcome.status) {
        Ok(())
    } else {
        Err(service_error(outcome, bucket, object).into())
    }
}

/// Decode a GET retention response.
pub fn interpret_retention(
    outcome: &TransportOutcome,
    bucket: &str,
    object: &str,
) -> Result<RetentionConfiguration> {
    check_status(Operation::GetRetention, outcome, bucket, Some(object))?;
    parse_retention_xml(&body_str(outcome)?)
}

/// Decode a GET encryption response.
pub fn interpret_encryption(outcome: &TransportOutcome, bucket: &str) -> Result<EncryptionConfiguration> {
    check_status(Operation::GetEncryption, outcome, bucket, None)?;
    parse_encryption_xml(&body_str(outcome)?)
}

/// Build the structured error for a non-success response.
pub fn service_error(outcome: &TransportOutcome, bucket: &str, object: Option<&str>) -> ServiceError {
    // Lossy: a mangled message must not hide the error code.
    let body = outcome.body_text();
    let document = Some(body.as_str())
        .filter(|body| !body.trim().is_empty())
        .and_then(|body| parse_error_document(body).ok());

    let (code, message) = match document {
        Some(ref doc) if doc.code.is_some() => (
            doc.code.clone().unwrap_or_default(),
            doc.message.clone().unwrap_or_default(),
        ),
        _ => {
            let code = fallback_code(outcome.status, object.is_some());
            (code.clone(), fallback_message(outcome.status, &code))
        }
    };

    let mut error = ServiceError::new(outcome.status, code, message, bucket);
    if let Some(object) = object {
        error = error.with_object(object);
    }

    let document = document.unwrap_or_default();
    error.resource = document.resource;
    error.request_id = document
        .request_id
        .or_else(|| outcome.header(REQUEST_ID_HEADER).map(str::to_string));
    error.host_id = document
        .host_id
        .or_else(|| outcome.header(HOST_ID_HEADER).map(str::to_string));
    error
}

fn fallback_code(status: u16, object_scoped: bool) -> String {
    match status {
        404 if object_scoped => "NoSuchKey".to_string(),
        404 => "NoSuchBucket".to_string(),
        403 => "AccessDenied".to_string(),
        409 => "Conflict".to_string(),
        412 => "PreconditionFailed".to_string(),
        501 => "MethodNotAllowed".to_string(),
        other => reason_phrase(other).replace(' ', ""),
    }
}

fn fallback_message(status: u16, code: &str) -> String {
    match code {
        "NoSuchKey" => "The specified key does not exist.".to_string(),
        "NoSuchBucket" => "The specified bucket does not exist.".to_string(),
        "AccessDenied" => "Access Denied.".to_string(),
        _ => format!("{} {}", status, reason_phrase(status)),
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

fn body_str(outcome: &TransportOutcome) -> Result<String> {
    String::from_utf8(outcome.body.clone())
        .map_err(|e| StrongboxError::Decode(format!("Response body is not UTF-8: {}", e)))
}
