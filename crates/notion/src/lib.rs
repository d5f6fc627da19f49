//! Notion infrastructure adapter for the repository ledger.
//!
//! Implements the [`ledger::RepositoryLedger`] trait against a Notion database
//! whose rows are pages with a fixed property schema (see [`properties`]).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. HTTP
//! transport, the property schema, query filters, and error classification
//! all live here; the [`ledger`] crate sees only [`ledger::RepositoryLedger`].
//!
//! ## Remote calls
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | `query_rows`, `query_rows_by_repository` | `POST /v1/databases/{id}/query` |
//! | `insert_row` | `POST /v1/pages` |
//! | `update_row`, `update_row_status` | `PATCH /v1/pages/{id}` |
//!
//! Every operation issues exactly one request. Only the first page of query
//! results is returned; nothing is retried.

pub mod client;
pub mod config;
mod error;
pub mod filter;
pub mod properties;
mod wire;

pub use client::{open_client, NotionClient};
pub use config::NotionConfig;
pub use properties::{status_properties, to_remote_properties, Properties, PropertyValue};
