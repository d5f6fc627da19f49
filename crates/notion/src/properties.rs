//! The ledger database's property schema and its mapping to [`LedgerEntry`].
//!
//! Notion stores every row as a page whose `properties` object maps a column
//! name to a typed value. The ledger uses one title column, four selects and
//! four checkboxes; the column names below must match the database exactly.

use std::collections::BTreeMap;

use ledger::{GitHubRepository, LedgerEntry, PermissionFlags};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ORGANIZATION: &str = "Organization";
pub const REPOSITORY: &str = "Repository";
pub const OWNER: &str = "Owner";
pub const USER_LOGIN: &str = "User Login";
pub const ADMIN: &str = "Admin";
pub const MAINTAIN: &str = "Maintain";
pub const PULL: &str = "Pull";
pub const PUSH: &str = "Push";
pub const STATUS: &str = "Status";

// ---------------------------------------------------------------------------
// Property values
// ---------------------------------------------------------------------------

/// A page's property bag, keyed by column name.
pub type Properties = BTreeMap<String, PropertyValue>;

/// One typed property value.
///
/// Only the types used by the ledger schema are modelled; any other column a
/// user adds to the database reads back as [`PropertyValue::Other`] and is
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    Select { select: Option<SelectOption> },
    Checkbox { checkbox: bool },
    #[serde(other)]
    Other,
}

impl PropertyValue {
    pub fn title(content: impl Into<String>) -> Self {
        Self::Title {
            title: vec![RichText::plain(content)],
        }
    }

    pub fn select(name: impl Into<String>) -> Self {
        Self::Select {
            select: Some(SelectOption {
                name: name.into(),
                color: None,
            }),
        }
    }

    pub fn checkbox(checked: bool) -> Self {
        Self::Checkbox { checkbox: checked }
    }
}

/// A rich-text fragment. Written as plain text; read back from whichever of
/// `plain_text` or `text.content` the service sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            text: Some(TextContent {
                content: content.into(),
            }),
            plain_text: None,
        }
    }

    fn as_str(&self) -> &str {
        self.plain_text
            .as_deref()
            .or_else(|| self.text.as_ref().map(|t| t.content.as_str()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

/// A select option. Options are matched by name; new names create new options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Builds the full nine-property payload for a record and status.
///
/// Shared by insert and full update so the two writes cannot drift apart.
pub fn to_remote_properties(repository: &GitHubRepository, status: &str) -> Properties {
    entry_to_properties(&LedgerEntry::from_repository(repository, status))
}

/// Builds a payload that touches only the `Status` column.
pub fn status_properties(status: &str) -> Properties {
    Properties::from([(STATUS.to_string(), PropertyValue::select(status))])
}

fn entry_to_properties(entry: &LedgerEntry) -> Properties {
    let PermissionFlags {
        admin,
        maintain,
        pull,
        push,
    } = entry.permissions;

    let mut properties = Properties::from([
        (ORGANIZATION.to_string(), PropertyValue::title(&entry.organization)),
        (REPOSITORY.to_string(), PropertyValue::select(&entry.repository)),
        (OWNER.to_string(), PropertyValue::select(&entry.owner)),
        (USER_LOGIN.to_string(), PropertyValue::select(&entry.user_login)),
        (ADMIN.to_string(), PropertyValue::checkbox(admin)),
        (MAINTAIN.to_string(), PropertyValue::checkbox(maintain)),
        (PULL.to_string(), PropertyValue::checkbox(pull)),
        (PUSH.to_string(), PropertyValue::checkbox(push)),
    ]);
    if let Some(status) = &entry.status {
        properties.insert(STATUS.to_string(), PropertyValue::select(status));
    }
    properties
}

/// Reads a [`LedgerEntry`] back from a page's properties.
///
/// Missing columns and empty selects read as empty strings (or `false` for
/// checkboxes); a missing status reads as `None`.
pub fn entry_from_properties(properties: &Properties) -> LedgerEntry {
    LedgerEntry {
        organization: read_title(properties, ORGANIZATION),
        repository: read_select(properties, REPOSITORY).unwrap_or_default(),
        owner: read_select(properties, OWNER).unwrap_or_default(),
        user_login: read_select(properties, USER_LOGIN).unwrap_or_default(),
        permissions: PermissionFlags {
            admin: read_checkbox(properties, ADMIN),
            maintain: read_checkbox(properties, MAINTAIN),
            pull: read_checkbox(properties, PULL),
            push: read_checkbox(properties, PUSH),
        },
        status: read_select(properties, STATUS),
    }
}

fn read_title(properties: &Properties, column: &str) -> String {
    match properties.get(column) {
        Some(PropertyValue::Title { title }) => title.iter().map(RichText::as_str).collect(),
        _ => String::new(),
    }
}

fn read_select(properties: &Properties, column: &str) -> Option<String> {
    match properties.get(column) {
        Some(PropertyValue::Select {
            select: Some(option),
        }) => Some(option.name.clone()),
        _ => None,
    }
}

fn read_checkbox(properties: &Properties, column: &str) -> bool {
    matches!(
        properties.get(column),
        Some(PropertyValue::Checkbox { checkbox: true })
    )
}
