//! Translation of Notion failures into [`LedgerError`].
//!
//! The service answers every failure with a JSON body carrying a `code` and a
//! `message`. Both are kept verbatim in the error message; the HTTP status and
//! code together pick the [`ErrorClass`].

use ledger::{ErrorClass, LedgerError, LedgerOperation};
use reqwest::StatusCode;

use crate::wire::ApiErrorBody;

/// Maps an HTTP status and Notion error code to a coarse class.
///
/// The code wins when it is recognised; the status is the fallback.
pub(crate) fn classify(status: StatusCode, code: Option<&str>) -> ErrorClass {
    match code {
        Some("unauthorized" | "restricted_resource") => return ErrorClass::Auth,
        Some("object_not_found") => return ErrorClass::NotFound,
        Some("rate_limited") => return ErrorClass::RateLimited,
        Some("validation_error" | "invalid_request" | "invalid_json" | "conflict_error") => {
            return ErrorClass::Validation
        }
        _ => {}
    }

    match status.as_u16() {
        401 | 403 => ErrorClass::Auth,
        404 => ErrorClass::NotFound,
        429 => ErrorClass::RateLimited,
        400 | 409 | 422 => ErrorClass::Validation,
        _ => ErrorClass::Unknown,
    }
}

/// Builds the error for a non-success response.
///
/// `body` is the raw response text; when it is not a Notion error object the
/// raw text is kept instead.
pub(crate) fn from_response(
    operation: LedgerOperation,
    status: StatusCode,
    body: &str,
) -> LedgerError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let class = classify(status, parsed.code.as_deref());

    let message = match (parsed.code, parsed.message) {
        (Some(code), Some(message)) => format!("{} {code}: {message}", status.as_u16()),
        (None, Some(message)) => format!("{}: {message}", status.as_u16()),
        (Some(code), None) => format!("{} {code}", status.as_u16()),
        (None, None) if body.trim().is_empty() => status.to_string(),
        (None, None) => format!("{}: {}", status.as_u16(), body.trim()),
    };

    LedgerError::remote(operation, class, message)
}

/// Builds the error for a request that never produced a usable response.
pub(crate) fn from_transport(operation: LedgerOperation, err: &reqwest::Error) -> LedgerError {
    let class = if err.is_decode() {
        ErrorClass::Unknown
    } else {
        ErrorClass::Network
    };
    LedgerError::remote(operation, class, err.to_string())
}

/// Builds the error for a 2xx response whose body is not the expected shape.
pub(crate) fn invalid_response(operation: LedgerOperation, detail: impl std::fmt::Display) -> LedgerError {
    LedgerError::remote(
        operation,
        ErrorClass::Unknown,
        format!("invalid response from Notion: {detail}"),
    )
}
