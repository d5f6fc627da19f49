//! HTTP client for the Notion ledger database.

use std::time::Duration;

use async_trait::async_trait;
use ledger::{
    GitHubRepository, LedgerError, LedgerOperation, LedgerRow, PageId, RepositoryLedger,
    Timestamp, STATUS_OPEN,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, trace, warn};

use crate::config::NotionConfig;
use crate::error;
use crate::filter::{self, Filter};
use crate::properties::{self, Properties};
use crate::wire::{
    DatabaseQueryRequest, DatabaseQueryResponse, Page, PageCreateRequest, PageUpdateRequest,
    Parent,
};

const NOTION_VERSION_HEADER: &str = "Notion-Version";
const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Builds a client bound to the configured token and database.
///
/// Neither the token nor the database is checked here; a bad value surfaces
/// as an error from the first call that uses it.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialised (see [`Client::new`]).
pub fn open_client(config: &NotionConfig) -> NotionClient {
    NotionClient::new(config)
}

/// Client for one Notion ledger database.
///
/// Cheap to clone; clones share the underlying connection pool. Holds no
/// mutable state, so one handle may serve concurrent calls.
#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    token: String,
    database_id: String,
    base_url: String,
    api_version: String,
    timeout: Duration,
}

impl NotionClient {
    /// Builds a client from `config`. Panics under the same condition as
    /// [`open_client`].
    pub fn new(config: &NotionConfig) -> Self {
        Self {
            http: Client::new(),
            token: config.token.clone(),
            database_id: config.database_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            timeout: config.timeout().max(MIN_TIMEOUT),
        }
    }

    /// Returns the database this client reads and writes.
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/v1/{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header(NOTION_VERSION_HEADER, &self.api_version)
            .timeout(self.timeout)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: LedgerOperation,
        request: RequestBuilder,
    ) -> Result<T, LedgerError> {
        let response = request.send().await.map_err(|e| {
            error!(%operation, error = %e, "Network error during Notion request");
            error::from_transport(operation, &e)
        })?;

        let status = response.status();
        debug!(%operation, status = %status, "Received response from Notion");

        let body = response.text().await.map_err(|e| {
            error!(%operation, error = %e, "Failed to read Notion response body");
            error::from_transport(operation, &e)
        })?;

        if !status.is_success() {
            let err = error::from_response(operation, status, &body);
            error!(%operation, class = %err.class(), message = %err.message(), "Notion API error");
            return Err(err);
        }

        trace!(body = %body, "Response body");

        serde_json::from_str(&body).map_err(|e| {
            error!(%operation, error = %e, "Failed to parse Notion response");
            error::invalid_response(operation, e)
        })
    }

    async fn query_database(
        &self,
        operation: LedgerOperation,
        filter: &Filter,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        let path = format!("databases/{}/query", self.database_id);
        let request = self
            .request(Method::POST, &path)
            .json(&DatabaseQueryRequest { filter });

        let response: DatabaseQueryResponse = self.send(operation, request).await?;

        if response.has_more {
            warn!(
                %operation,
                returned = response.results.len(),
                next_cursor = response.next_cursor.as_deref().unwrap_or_default(),
                "Query matched more rows than one page; only the first page is returned"
            );
        }

        let rows = response
            .results
            .into_iter()
            .map(|page| page_to_row(operation, page))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(%operation, row_count = rows.len(), "Query completed");
        Ok(rows)
    }

    async fn update_page(
        &self,
        operation: LedgerOperation,
        page_id: &PageId,
        properties: &Properties,
    ) -> Result<LedgerRow, LedgerError> {
        let path = format!("pages/{page_id}");
        let request = self
            .request(Method::PATCH, &path)
            .json(&PageUpdateRequest { properties });

        let page: Page = self.send(operation, request).await?;
        page_to_row(operation, page)
    }
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("token", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn page_to_row(operation: LedgerOperation, page: Page) -> Result<LedgerRow, LedgerError> {
    let page_id =
        PageId::new(page.id).ok_or_else(|| error::invalid_response(operation, "page without id"))?;

    Ok(LedgerRow {
        page_id,
        entry: properties::entry_from_properties(&page.properties),
        url: page.url,
        created_time: page.created_time.map(Timestamp::from_utc),
        last_edited_time: page.last_edited_time.map(Timestamp::from_utc),
    })
}

#[async_trait]
impl RepositoryLedger for NotionClient {
    #[instrument(skip(self))]
    async fn query_rows(
        &self,
        repository_name: &str,
        user_login: &str,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        let filter = filter::by_repository_and_user(repository_name, user_login);
        self.query_database(LedgerOperation::QueryRows, &filter)
            .await
    }

    #[instrument(skip(self))]
    async fn query_rows_by_repository(
        &self,
        repository_name: &str,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        let filter = filter::by_repository(repository_name);
        self.query_database(LedgerOperation::QueryRowsByRepository, &filter)
            .await
    }

    #[instrument(
        skip(self, repository),
        fields(repository = %repository.repository_name, user = %repository.user_login)
    )]
    async fn insert_row(&self, repository: &GitHubRepository) -> Result<LedgerRow, LedgerError> {
        let operation = LedgerOperation::InsertRow;
        let properties = properties::to_remote_properties(repository, STATUS_OPEN);
        let request = self.request(Method::POST, "pages").json(&PageCreateRequest {
            parent: Parent {
                database_id: &self.database_id,
            },
            properties: &properties,
        });

        let page: Page = self.send(operation, request).await?;
        let row = page_to_row(operation, page)?;
        debug!(page_id = %row.page_id, "Created ledger row");
        Ok(row)
    }

    #[instrument(
        skip(self, page_id, repository),
        fields(%page_id, repository = %repository.repository_name, user = %repository.user_login)
    )]
    async fn update_row(
        &self,
        page_id: &PageId,
        repository: &GitHubRepository,
        status: &str,
    ) -> Result<LedgerRow, LedgerError> {
        let properties = properties::to_remote_properties(repository, status);
        self.update_page(LedgerOperation::UpdateRow, page_id, &properties)
            .await
    }

    #[instrument(skip(self, page_id), fields(%page_id))]
    async fn update_row_status(
        &self,
        page_id: &PageId,
        status: &str,
    ) -> Result<LedgerRow, LedgerError> {
        let properties = properties::status_properties(status);
        self.update_page(LedgerOperation::UpdateRowStatus, page_id, &properties)
            .await
    }
}
