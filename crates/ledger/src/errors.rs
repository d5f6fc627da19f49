//! Error taxonomy for ledger operations.
//!
//! Every failed call to the remote ledger surfaces as
//! [`LedgerError::RemoteOperationFailed`]. The variant keeps the original
//! diagnostic text and adds the [`LedgerOperation`] that failed plus a coarse
//! [`ErrorClass`] callers can branch on. No operation recovers locally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Operation names
// ---------------------------------------------------------------------------

/// The ledger operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOperation {
    QueryRows,
    QueryRowsByRepository,
    InsertRow,
    UpdateRow,
    UpdateRowStatus,
}

impl LedgerOperation {
    /// Returns the stable snake_case name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QueryRows => "query_rows",
            Self::QueryRowsByRepository => "query_rows_by_repository",
            Self::InsertRow => "insert_row",
            Self::UpdateRow => "update_row",
            Self::UpdateRowStatus => "update_row_status",
        }
    }
}

impl std::fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Coarse classification of a remote failure.
///
/// Derived from the HTTP status and the service's error code where the
/// transport reports them. The original message is always kept alongside, so
/// `Unknown` never loses information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Token missing, invalid, or lacking access to the database or page.
    Auth,
    /// The database or page does not exist (or is not shared with the token).
    NotFound,
    /// The service rejected the call because of request volume.
    RateLimited,
    /// The request did not match the database schema or API contract.
    Validation,
    /// The request never produced an HTTP response (connect, timeout, body read).
    Network,
    Unknown,
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Ledger errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::RepositoryLedger`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LedgerError {
    /// The outbound call to the remote ledger failed.
    ///
    /// Produced for network, authentication, validation, not-found and
    /// rate-limit failures alike; `class` tells them apart.
    #[error("{operation} failed ({class}): {message}")]
    RemoteOperationFailed {
        /// Which ledger operation issued the failing call.
        operation: LedgerOperation,
        /// Coarse classification of the failure.
        class: ErrorClass,
        /// Original diagnostic text from the service or transport.
        message: String,
    },
}

impl LedgerError {
    /// Creates a [`LedgerError::RemoteOperationFailed`].
    pub fn remote(
        operation: LedgerOperation,
        class: ErrorClass,
        message: impl Into<String>,
    ) -> Self {
        Self::RemoteOperationFailed {
            operation,
            class,
            message: message.into(),
        }
    }

    pub fn operation(&self) -> LedgerOperation {
        match self {
            Self::RemoteOperationFailed { operation, .. } => *operation,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::RemoteOperationFailed { class, .. } => *class,
        }
    }

    /// Returns the original diagnostic text.
    pub fn message(&self) -> &str {
        match self {
            Self::RemoteOperationFailed { message, .. } => message,
        }
    }
}
