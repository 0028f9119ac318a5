//! # Records and Queries
//!
//! Row values exchanged with the reference storage engine. A [`Record`] is an
//! attribute map; a [`Query`] is a conjunction of [`Condition`]s evaluated
//! against records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute map of a record.
pub type Attributes = serde_json::Map<String, Value>;

/// A stored row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    attributes: Attributes,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Attributes) -> Self {
        Self { attributes }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// True when the attribute is present and not null.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Overwrites attributes with the given values.
    pub fn merge(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl From<Attributes> for Record {
    fn from(attributes: Attributes) -> Self {
        Self::from_attributes(attributes)
    }
}

/// A single predicate of a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals { column: String, value: Value },
    IsNull(String),
    NotNull(String),
}

impl Condition {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Condition::Equals { column, value } => {
                record.get(column).unwrap_or(&Value::Null) == value
            }
            Condition::IsNull(column) => !record.is_set(column),
            Condition::NotNull(column) => record.is_set(column),
        }
    }
}

/// Conjunction of conditions applied to a fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Condition::Equals {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn where_null(mut self, column: impl Into<String>) -> Self {
        self.push(Condition::IsNull(column.into()));
        self
    }

    pub fn where_not_null(mut self, column: impl Into<String>) -> Self {
        self.push(Condition::NotNull(column.into()));
        self
    }

    /// Adds a condition in place (used by listeners scoping a fetch).
    pub fn push(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}
