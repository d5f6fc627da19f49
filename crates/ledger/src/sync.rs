//! Reconciles a snapshot of GitHub access records with the ledger.
//!
//! For every record the ledger ends up holding an `"open"` row that matches
//! it. Rows for users that no longer appear in a synced repository are marked
//! `"closed"`. Rows are never deleted.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    GitHubRepository, LedgerEntry, LedgerError, RepositoryLedger, STATUS_CLOSED, STATUS_OPEN,
};

/// Counts of what a sync run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Records with no existing row; a new row was created.
    pub inserted: usize,
    /// Records whose existing row differed and was overwritten.
    pub updated: usize,
    /// Records whose existing row already matched.
    pub unchanged: usize,
    /// Rows whose user no longer has access and were marked closed.
    pub closed: usize,
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inserted={} updated={} unchanged={} closed={}",
            self.inserted, self.updated, self.unchanged, self.closed
        )
    }
}

/// Upserts every record and closes rows of users absent from the snapshot.
///
/// Only repositories present in `records` are considered for closing. The
/// first failing call aborts the run; rows written before it stay written.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn sync_repositories<L>(
    ledger: &L,
    records: &[GitHubRepository],
) -> Result<SyncReport, LedgerError>
where
    L: RepositoryLedger + ?Sized,
{
    let mut report = SyncReport::default();
    let mut active_users: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for record in records {
        active_users
            .entry(record.repository_name.as_str())
            .or_default()
            .insert(record.user_login.as_str());

        let rows = ledger
            .query_rows(&record.repository_name, &record.user_login)
            .await?;

        let Some((row, duplicates)) = rows.split_first() else {
            let row = ledger.insert_row(record).await?;
            debug!(
                page_id = %row.page_id,
                repository = %record.repository_name,
                user = %record.user_login,
                "Inserted ledger row"
            );
            report.inserted += 1;
            continue;
        };

        if !duplicates.is_empty() {
            warn!(
                repository = %record.repository_name,
                user = %record.user_login,
                duplicates = duplicates.len(),
                "Multiple ledger rows for one repository/user; only the first is kept in sync"
            );
        }

        if row.entry == LedgerEntry::from_repository(record, STATUS_OPEN) {
            report.unchanged += 1;
            continue;
        }

        ledger
            .update_row(&row.page_id, record, STATUS_OPEN)
            .await?;
        debug!(page_id = %row.page_id, "Updated ledger row");
        report.updated += 1;
    }

    for (repository, users) in &active_users {
        for row in ledger.query_rows_by_repository(repository).await? {
            if users.contains(row.entry.user_login.as_str()) || row.entry.has_status(STATUS_CLOSED) {
                continue;
            }
            ledger
                .update_row_status(&row.page_id, STATUS_CLOSED)
                .await?;
            debug!(
                page_id = %row.page_id,
                repository = %repository,
                user = %row.entry.user_login,
                "Closed ledger row"
            );
            report.closed += 1;
        }
    }

    info!(%report, "Sync finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{ErrorClass, LedgerOperation, LedgerRow, PageId};

    /// Ledger kept in memory; records every write for assertions.
    #[derive(Default)]
    struct InMemoryLedger {
        rows: Mutex<Vec<LedgerRow>>,
        writes: Mutex<Vec<String>>,
        next_id: Mutex<u32>,
        fail_inserts: bool,
    }

    impl InMemoryLedger {
        fn with_rows(entries: Vec<LedgerEntry>) -> Self {
            let ledger = Self::default();
            for entry in entries {
                ledger.push(entry);
            }
            ledger
        }

        fn push(&self, entry: LedgerEntry) -> LedgerRow {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let row = LedgerRow {
                page_id: PageId::new(format!("page-{next}")).unwrap(),
                entry,
                url: None,
                created_time: None,
                last_edited_time: None,
            };
            self.rows.lock().unwrap().push(row.clone());
            row
        }

        fn rows(&self) -> Vec<LedgerRow> {
            self.rows.lock().unwrap().clone()
        }

        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }

        fn modify(
            &self,
            page_id: &PageId,
            operation: LedgerOperation,
            f: impl FnOnce(&mut LedgerEntry),
        ) -> Result<LedgerRow, LedgerError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| &r.page_id == page_id)
                .ok_or_else(|| LedgerError::remote(operation, ErrorClass::NotFound, "no such page"))?;
            f(&mut row.entry);
            self.writes
                .lock()
                .unwrap()
                .push(format!("{operation}:{page_id}"));
            Ok(row.clone())
        }
    }

    #[async_trait]
    impl RepositoryLedger for InMemoryLedger {
        async fn query_rows(
            &self,
            repository_name: &str,
            user_login: &str,
        ) -> Result<Vec<LedgerRow>, LedgerError> {
            Ok(self
                .rows()
                .into_iter()
                .filter(|r| r.entry.repository == repository_name && r.entry.user_login == user_login)
                .collect())
        }

        async fn query_rows_by_repository(
            &self,
            repository_name: &str,
        ) -> Result<Vec<LedgerRow>, LedgerError> {
            Ok(self
                .rows()
                .into_iter()
                .filter(|r| r.entry.repository == repository_name)
                .collect())
        }

        async fn insert_row(&self, repository: &GitHubRepository) -> Result<LedgerRow, LedgerError> {
            if self.fail_inserts {
                return Err(LedgerError::remote(
                    LedgerOperation::InsertRow,
                    ErrorClass::Auth,
                    "401 unauthorized: API token is invalid.",
                ));
            }
            let row = self.push(LedgerEntry::from_repository(repository, STATUS_OPEN));
            self.writes
                .lock()
                .unwrap()
                .push(format!("insert_row:{}", row.page_id));
            Ok(row)
        }

        async fn update_row(
            &self,
            page_id: &PageId,
            repository: &GitHubRepository,
            status: &str,
        ) -> Result<LedgerRow, LedgerError> {
            let entry = LedgerEntry::from_repository(repository, status);
            self.modify(page_id, LedgerOperation::UpdateRow, |e| *e = entry)
        }

        async fn update_row_status(
            &self,
            page_id: &PageId,
            status: &str,
        ) -> Result<LedgerRow, LedgerError> {
            self.modify(page_id, LedgerOperation::UpdateRowStatus, |e| {
                e.status = Some(status.to_string())
            })
        }
    }

    fn record(repository: &str, user: &str, push: bool) -> GitHubRepository {
        GitHubRepository {
            organization_name: "Acme".to_string(),
            repository_name: repository.to_string(),
            repository_owner: "acme".to_string(),
            user_login: user.to_string(),
            permission: [("pull".to_string(), true), ("push".to_string(), push)]
                .into_iter()
                .collect(),
        }
    }

    #[tokio::test]
    async fn inserted_row_is_found_by_repository_query() {
        let ledger = InMemoryLedger::default();
        let repo = record("widgets", "octocat", true);

        let inserted = ledger.insert_row(&repo).await.unwrap();
        let rows = ledger.query_rows_by_repository("widgets").await.unwrap();

        assert_eq!(rows, vec![inserted]);
        assert_eq!(rows[0].entry, LedgerEntry::from_repository(&repo, STATUS_OPEN));
    }

    #[tokio::test]
    async fn sync_inserts_rows_for_new_records() {
        let ledger = InMemoryLedger::default();
        let records = vec![record("widgets", "octocat", true), record("widgets", "hubot", false)];

        let report = sync_repositories(&ledger, &records).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.closed, 0);
        let rows = ledger.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.entry.has_status(STATUS_OPEN)));
    }

    #[tokio::test]
    async fn sync_leaves_matching_rows_untouched() {
        let repo = record("widgets", "octocat", true);
        let ledger = InMemoryLedger::with_rows(vec![LedgerEntry::from_repository(&repo, STATUS_OPEN)]);

        let report = sync_repositories(&ledger, &[repo]).await.unwrap();

        assert_eq!(
            report,
            SyncReport {
                unchanged: 1,
                ..SyncReport::default()
            }
        );
        assert!(ledger.writes().is_empty());
    }

    #[tokio::test]
    async fn sync_overwrites_drifted_row_and_reopens_it() {
        let old = record("widgets", "octocat", false);
        let ledger = InMemoryLedger::with_rows(vec![LedgerEntry::from_repository(&old, STATUS_CLOSED)]);
        let current = record("widgets", "octocat", true);

        let report = sync_repositories(&ledger, &[current.clone()]).await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(ledger.writes(), vec!["update_row:page-1".to_string()]);
        assert_eq!(
            ledger.rows()[0].entry,
            LedgerEntry::from_repository(&current, STATUS_OPEN)
        );
    }

    #[tokio::test]
    async fn sync_closes_rows_of_users_who_lost_access() {
        let kept = record("widgets", "octocat", true);
        let gone = record("widgets", "hubot", true);
        let other_repo = record("gadgets", "hubot", true);
        let ledger = InMemoryLedger::with_rows(vec![
            LedgerEntry::from_repository(&kept, STATUS_OPEN),
            LedgerEntry::from_repository(&gone, STATUS_OPEN),
            LedgerEntry::from_repository(&other_repo, STATUS_OPEN),
        ]);

        let report = sync_repositories(&ledger, &[kept]).await.unwrap();

        assert_eq!(report.closed, 1);
        assert_eq!(ledger.writes(), vec!["update_row_status:page-2".to_string()]);
        let rows = ledger.rows();
        assert!(rows[1].entry.has_status(STATUS_CLOSED));
        // Everything but the status is left as it was.
        assert_eq!(
            LedgerEntry {
                status: Some(STATUS_OPEN.to_string()),
                ..rows[1].entry.clone()
            },
            LedgerEntry::from_repository(&gone, STATUS_OPEN)
        );
        // Repositories outside the snapshot are not touched.
        assert!(rows[2].entry.has_status(STATUS_OPEN));
    }

    #[tokio::test]
    async fn sync_does_not_close_rows_twice() {
        let kept = record("widgets", "octocat", true);
        let gone = record("widgets", "hubot", true);
        let ledger = InMemoryLedger::with_rows(vec![
            LedgerEntry::from_repository(&kept, STATUS_OPEN),
            LedgerEntry::from_repository(&gone, STATUS_CLOSED),
        ]);

        let report = sync_repositories(&ledger, &[kept]).await.unwrap();

        assert_eq!(report.closed, 0);
        assert!(ledger.writes().is_empty());
    }

    #[tokio::test]
    async fn sync_only_keeps_first_duplicate_in_step() {
        let repo = record("widgets", "octocat", true);
        let stale = record("widgets", "octocat", false);
        let ledger = InMemoryLedger::with_rows(vec![
            LedgerEntry::from_repository(&repo, STATUS_OPEN),
            LedgerEntry::from_repository(&stale, STATUS_OPEN),
        ]);

        let report = sync_repositories(&ledger, &[repo]).await.unwrap();

        assert_eq!(report.unchanged, 1);
        assert_eq!(report.closed, 0);
        assert!(ledger.writes().is_empty());
    }

    #[tokio::test]
    async fn sync_propagates_the_first_remote_failure() {
        let ledger = InMemoryLedger {
            fail_inserts: true,
            ..InMemoryLedger::default()
        };

        let err = sync_repositories(&ledger, &[record("widgets", "octocat", true)])
            .await
            .unwrap_err();

        assert_eq!(err.operation(), LedgerOperation::InsertRow);
        assert_eq!(err.class(), ErrorClass::Auth);
        assert!(err.message().contains("API token is invalid"));
    }
}
