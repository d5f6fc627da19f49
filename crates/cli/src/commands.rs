//! Command implementations, written against the [`RepositoryLedger`] port so
//! they run unchanged over Notion or a test double.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ledger::{sync_repositories, GitHubRepository, PageId, RepositoryLedger, SyncReport};
use tracing::info;

/// Reads a JSON array of access records.
pub fn read_records(path: &Path) -> Result<Vec<GitHubRepository>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse records in {}", path.display()))
}

pub async fn sync(
    ledger: &dyn RepositoryLedger,
    input: &Path,
    out: &mut impl Write,
) -> Result<SyncReport> {
    let records = read_records(input)?;
    info!(records = records.len(), input = %input.display(), "Loaded access records");

    let report = sync_repositories(ledger, &records)
        .await
        .context("Sync aborted")?;

    writeln!(out, "{report}")?;
    Ok(report)
}

/// Prints every matching row as one JSON line; returns the row count.
pub async fn query(
    ledger: &dyn RepositoryLedger,
    repository: &str,
    user: Option<&str>,
    out: &mut impl Write,
) -> Result<usize> {
    let rows = match user {
        Some(user) => ledger.query_rows(repository, user).await?,
        None => ledger.query_rows_by_repository(repository).await?,
    };

    for row in &rows {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    Ok(rows.len())
}

pub async fn set_status(
    ledger: &dyn RepositoryLedger,
    page_id: &str,
    status: &str,
    out: &mut impl Write,
) -> Result<()> {
    let page_id = PageId::new(page_id).context("Page id must not be empty")?;
    let row = ledger.update_row_status(&page_id, status).await?;
    writeln!(out, "{}", serde_json::to_string(&row)?)?;
    Ok(())
}
