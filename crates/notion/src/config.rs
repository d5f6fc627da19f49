//! Connection settings for the Notion client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// API version sent in the `Notion-Version` header.
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything [`crate::open_client`] needs; supplied by the caller.
///
/// `token` is an integration secret. It is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration access token.
    pub token: String,
    /// Identifier of the ledger database.
    pub database_id: String,
    /// API origin, without the `/v1` path. Overridden in tests.
    pub base_url: String,
    pub api_version: String,
    /// Per-request timeout in seconds. Values below 1 are raised to 1 by
    /// [`crate::NotionClient::new`].
    pub timeout_secs: u64,
}

impl NotionConfig {
    /// Creates a configuration with default endpoint settings.
    pub fn new(token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            database_id: database_id.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            database_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
