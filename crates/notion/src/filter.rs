//! Database query filters.

use serde::Serialize;

use crate::properties::{REPOSITORY, USER_LOGIN};

/// A filter accepted by the database query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Filter {
    /// A single property condition.
    Property(PropertyFilter),
    /// Every condition must hold.
    And { and: Vec<PropertyFilter> },
}

/// A condition on one named property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFilter {
    pub property: String,
    #[serde(flatten)]
    pub condition: Condition,
}

/// The typed condition, keyed by the property type it applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Select(SelectCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectCondition {
    Equals(String),
}

impl PropertyFilter {
    /// Exact, case-sensitive match on a select property.
    pub fn select_equals(property: &str, value: impl Into<String>) -> Self {
        Self {
            property: property.to_string(),
            condition: Condition::Select(SelectCondition::Equals(value.into())),
        }
    }
}

/// Rows of one repository.
pub fn by_repository(repository_name: &str) -> Filter {
    Filter::Property(PropertyFilter::select_equals(REPOSITORY, repository_name))
}

/// Rows of one repository and one user.
pub fn by_repository_and_user(repository_name: &str, user_login: &str) -> Filter {
    Filter::And {
        and: vec![
            PropertyFilter::select_equals(REPOSITORY, repository_name),
            PropertyFilter::select_equals(USER_LOGIN, user_login),
        ],
    }
}
