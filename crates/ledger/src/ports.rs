//! Port definitions implemented by infrastructure crates.
//!
//! The domain defines *what* a ledger must offer; the `notion` crate defines
//! *how* it is supplied over HTTP.

use async_trait::async_trait;

use crate::{GitHubRepository, LedgerError, LedgerRow, PageId};

/// A remote ledger of repository access rows.
///
/// Every method issues exactly one remote call and returns once it completes
/// or fails. Implementations hold no mutable session state, so one handle can
/// serve concurrent callers. No method retries, paginates, or deduplicates.
#[async_trait]
pub trait RepositoryLedger: Send + Sync {
    /// Returns the rows whose repository and user login both equal the given
    /// values. Zero matches is an empty vector, not an error.
    async fn query_rows(
        &self,
        repository_name: &str,
        user_login: &str,
    ) -> Result<Vec<LedgerRow>, LedgerError>;

    /// Returns every row for the given repository regardless of user.
    async fn query_rows_by_repository(
        &self,
        repository_name: &str,
    ) -> Result<Vec<LedgerRow>, LedgerError>;

    /// Creates a new row from `repository` with status `"open"`.
    ///
    /// Calling this twice for the same record creates two rows.
    async fn insert_row(&self, repository: &GitHubRepository) -> Result<LedgerRow, LedgerError>;

    /// Overwrites every property of an existing row from `repository` and `status`.
    async fn update_row(
        &self,
        page_id: &PageId,
        repository: &GitHubRepository,
        status: &str,
    ) -> Result<LedgerRow, LedgerError>;

    /// Changes only the status of an existing row.
    async fn update_row_status(
        &self,
        page_id: &PageId,
        status: &str,
    ) -> Result<LedgerRow, LedgerError>;
}
