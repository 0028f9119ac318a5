//! # Storage Tables
//!
//! Table descriptions for the reference storage engine. A [`Table`] is derived
//! from a resolved schema for store-backed resources, then handed to
//! decorators and the resource's own `model` hook before a [`Model`](crate::model::Model)
//! is built around it.

use serde::Serialize;
use std::fmt::{self, Display};

/// Column holding the creation timestamp.
pub const CREATED_AT: &str = "created_at";
/// Column holding the last-update timestamp.
pub const UPDATED_AT: &str = "updated_at";
/// Column holding the soft-deletion marker.
pub const DELETED_AT: &str = "deleted_at";

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Auto-incrementing integer key.
    Increments,
    Integer,
    String,
    Text,
    Boolean,
    Float,
    DateTime,
    Json,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Increments => "increments",
            ColumnType::Integer => "integer",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Float => "float",
            ColumnType::DateTime => "datetime",
            ColumnType::Json => "json",
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates one typed builder method per [`ColumnType`] on a type exposing
/// `fn column(&mut self, ColumnType, impl Into<String>) -> &mut $item`.
macro_rules! typed_column_builders {
    ($item:ty) => {
        pub fn increments(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::Increments, name)
        }
        pub fn integer(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::Integer, name)
        }
        pub fn string(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::String, name)
        }
        pub fn text(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::Text, name)
        }
        pub fn boolean(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::Boolean, name)
        }
        pub fn float(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::Float, name)
        }
        pub fn datetime(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::DateTime, name)
        }
        pub fn json(&mut self, name: impl Into<String>) -> &mut $item {
            self.column($crate::table::ColumnType::Json, name)
        }
    };
}

pub(crate) use typed_column_builders;

/// A single column of a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    name: String,
    column_type: ColumnType,
    primary: bool,
    nullable: bool,
}

impl TableColumn {
    pub fn new(column_type: ColumnType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary: false,
            nullable: false,
        }
    }

    pub fn primary(&mut self) -> &mut Self {
        self.primary = true;
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// Description of a storage table: a name plus ordered columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<TableColumn>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table name.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn table_name(&self) -> &str {
        &self.name
    }

    /// Adds a column, or retypes the existing column with the same name.
    pub fn column(&mut self, column_type: ColumnType, name: impl Into<String>) -> &mut TableColumn {
        let name = name.into();
        match self.columns.iter().position(|c| c.name == name) {
            Some(index) => {
                let column = &mut self.columns[index];
                column.column_type = column_type;
                column
            }
            None => {
                self.columns.push(TableColumn::new(column_type, name));
                let last = self.columns.len() - 1;
                &mut self.columns[last]
            }
        }
    }

    typed_column_builders!(TableColumn);

    /// Adds nullable `created_at` and `updated_at` columns.
    pub fn timestamps(&mut self) -> &mut Self {
        self.datetime(CREATED_AT).nullable();
        self.datetime(UPDATED_AT).nullable();
        self
    }

    /// Adds the nullable `deleted_at` soft-deletion marker.
    pub fn soft_deletes(&mut self) -> &mut Self {
        self.datetime(DELETED_AT).nullable();
        self
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn primary_key(&self) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.primary)
    }
}
