//! Request and response bodies of the Notion endpoints the ledger uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::properties::Properties;

#[derive(Debug, Serialize)]
pub(crate) struct DatabaseQueryRequest<'a> {
    pub filter: &'a Filter,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatabaseQueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageCreateRequest<'a> {
    pub parent: Parent<'a>,
    pub properties: &'a Properties,
}

#[derive(Debug, Serialize)]
pub(crate) struct Parent<'a> {
    pub database_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageUpdateRequest<'a> {
    pub properties: &'a Properties,
}

/// A page object as returned by create, update, and query.
#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub properties: Properties,
}

/// The body of every non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
