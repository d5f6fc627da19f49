//! Value types for the repository audit ledger.
//!
//! [`GitHubRepository`] is the input record produced by the GitHub side;
//! [`LedgerEntry`] is the fixed nine-field shape every ledger row carries;
//! [`LedgerRow`] is a remote row as read back from the ledger service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PageId;

/// Status written by an insert.
pub const STATUS_OPEN: &str = "open";

/// Status written when a user no longer holds access to a repository.
pub const STATUS_CLOSED: &str = "closed";

// ---------------------------------------------------------------------------
// Input record
// ---------------------------------------------------------------------------

/// One user's access to one GitHub repository.
///
/// Owned by the caller and never mutated by the ledger. The `permission` map
/// is taken verbatim from GitHub (`admin`, `maintain`, `push`, `triage`,
/// `pull`); only the four flags in [`PermissionFlags`] reach the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepository {
    /// Display name of the owning organization.
    pub organization_name: String,
    /// Repository name, used as the row's "Repository" select value.
    pub repository_name: String,
    /// Repository owner login.
    pub repository_owner: String,
    /// Login of the user holding the permissions.
    pub user_login: String,
    /// Permission name to granted flag.
    #[serde(default, alias = "permissions")]
    pub permission: BTreeMap<String, bool>,
}

impl GitHubRepository {
    /// Returns the ledger-relevant permission flags; missing keys read as `false`.
    pub fn permission_flags(&self) -> PermissionFlags {
        PermissionFlags::from_map(&self.permission)
    }
}

// ---------------------------------------------------------------------------
// Permission flags
// ---------------------------------------------------------------------------

/// The four permission checkboxes stored on every ledger row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionFlags {
    pub admin: bool,
    pub maintain: bool,
    pub pull: bool,
    pub push: bool,
}

impl PermissionFlags {
    /// Extracts the four recognized flags from a GitHub permission map.
    pub fn from_map(map: &BTreeMap<String, bool>) -> Self {
        let flag = |name: &str| map.get(name).copied().unwrap_or(false);
        Self {
            admin: flag("admin"),
            maintain: flag("maintain"),
            pull: flag("pull"),
            push: flag("push"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger entry
// ---------------------------------------------------------------------------

/// The full property set of one ledger row.
///
/// Insert and full update always write every field. Rows created by hand on
/// the remote side may lack select values: those read back as empty strings,
/// and a missing status reads back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub organization: String,
    pub repository: String,
    pub owner: String,
    pub user_login: String,
    pub permissions: PermissionFlags,
    pub status: Option<String>,
}

impl LedgerEntry {
    /// Maps a GitHub record and a status onto the ledger's fixed schema.
    ///
    /// This is the only place the record-to-row mapping is defined; insert and
    /// full update both go through it.
    pub fn from_repository(repository: &GitHubRepository, status: &str) -> Self {
        Self {
            organization: repository.organization_name.clone(),
            repository: repository.repository_name.clone(),
            owner: repository.repository_owner.clone(),
            user_login: repository.user_login.clone(),
            permissions: repository.permission_flags(),
            status: Some(status.to_string()),
        }
    }

    /// Returns `true` if the row carries the given status.
    pub fn has_status(&self, status: &str) -> bool {
        self.status.as_deref() == Some(status)
    }
}

// ---------------------------------------------------------------------------
// Ledger row
// ---------------------------------------------------------------------------

/// A row as stored by the remote ledger service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Remote identifier of the row.
    pub page_id: PageId,
    /// Current property values.
    pub entry: LedgerEntry,
    /// Link to the row in the ledger UI, when reported.
    pub url: Option<String>,
    pub created_time: Option<Timestamp>,
    pub last_edited_time: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
