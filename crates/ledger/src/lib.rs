//! Domain model for the repository access audit ledger.
//!
//! This crate contains the GitHub access record, the fixed ledger row shape,
//! the error taxonomy, and the [`RepositoryLedger`] port. Infrastructure
//! crates implement the port; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PageId`, `SyncRunId`) |
//! | [`types`] | `GitHubRepository`, `PermissionFlags`, `LedgerEntry`, `LedgerRow` |
//! | [`errors`] | `LedgerError` and its classification |
//! | [`ports`] | The `RepositoryLedger` trait |
//! | [`sync`] | Reconciling a GitHub snapshot with the ledger |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod sync;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ErrorClass, LedgerError, LedgerOperation};
pub use identifiers::{PageId, SyncRunId};
pub use ports::RepositoryLedger;
pub use sync::{sync_repositories, SyncReport};
pub use types::{
    GitHubRepository, LedgerEntry, LedgerRow, PermissionFlags, Timestamp, STATUS_CLOSED,
    STATUS_OPEN,
};
