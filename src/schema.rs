//! # Resource Schemas
//!
//! A [`Schema`] is the field-level description of a resource: an optional
//! backing table name and an ordered list of [`Property`] entries, each mapped
//! onto a storage column.

use crate::table::{ColumnType, Table, TableColumn};
use serde::Serialize;

/// Storage column a property maps onto.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    primary: bool,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

/// A named field of a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    name: String,
    column: Column,
    nullable: bool,
}

impl Property {
    pub fn new(column_type: ColumnType, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column: Column {
                name: name.clone(),
                column_type,
                primary: false,
            },
            name,
            nullable: false,
        }
    }

    /// Marks the property's column as the primary key.
    pub fn primary(&mut self) -> &mut Self {
        self.column.primary = true;
        self
    }

    /// Maps the property onto a differently named column.
    pub fn column(&mut self, name: impl Into<String>) -> &mut Self {
        self.column.name = name.into();
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_column(&self) -> &Column {
        &self.column
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn from_table_column(column: &TableColumn) -> Self {
        let mut property = Self::new(column.column_type(), column.name());
        property.column.primary = column.is_primary();
        property.nullable = column.is_nullable();
        property
    }
}

/// Field-level description of a resource's data shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    table: Option<String>,
    properties: Vec<Property>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema with one property per column of `table`.
    pub fn from_table(table: &Table) -> Self {
        let name = table.table_name();
        Self {
            table: (!name.is_empty()).then(|| name.to_string()),
            properties: table
                .columns()
                .iter()
                .map(Property::from_table_column)
                .collect(),
        }
    }

    /// Names the table backing this schema.
    pub fn table(&mut self, name: impl Into<String>) -> &mut Self {
        self.table = Some(name.into());
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Adds a property, or retypes the existing property with the same name.
    pub fn column(&mut self, column_type: ColumnType, name: impl Into<String>) -> &mut Property {
        let name = name.into();
        match self.properties.iter().position(|p| p.name == name) {
            Some(index) => {
                let property = &mut self.properties[index];
                property.column.column_type = column_type;
                property
            }
            None => {
                self.properties.push(Property::new(column_type, name));
                let last = self.properties.len() - 1;
                &mut self.properties[last]
            }
        }
    }

    crate::table::typed_column_builders!(Property);

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Property> {
        let index = self.properties.iter().position(|p| p.name == name)?;
        Some(self.properties.remove(index))
    }

    pub fn names(&self) -> Vec<&str> {
        self.properties.iter().map(Property::name).collect()
    }

    pub fn primary_key(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.column.primary)
    }

    /// Renames table-derived properties after the declared property mapped to
    /// the same column. The column's type, key flag and nullability stay as
    /// the table defines them.
    pub(crate) fn overlay(&mut self, declared: &Schema) {
        if self.table.is_none() {
            self.table = declared.table.clone();
        }
        for property in &declared.properties {
            match self
                .properties
                .iter_mut()
                .find(|p| p.column.name == property.column.name)
            {
                Some(derived) => derived.name = property.name.clone(),
                None => self.properties.push(property.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder() {
        let mut schema = Schema::new();
        schema.table("posts");
        schema.increments("id").primary();
        schema.string("title").column("post_title");
        schema.text("body").nullable();

        assert_eq!(schema.table_name(), Some("posts"));
        assert_eq!(schema.names(), ["id", "title", "body"]);
        assert_eq!(schema.primary_key().map(Property::name), Some("id"));
        assert_eq!(
            schema.get("title").map(|p| p.get_column().name()),
            Some("post_title")
        );
        assert!(schema.get("body").is_some_and(Property::is_nullable));
    }

    #[test]
    fn test_from_table_then_overlay_keeps_declared_names() {
        let mut declared = Schema::new();
        declared.increments("id").primary();
        declared.string("title").column("post_title");

        let mut table = Table::new();
        table.name("posts");
        table.increments("id").primary();
        table.string("post_title");
        table.timestamps();

        let mut schema = Schema::from_table(&table);
        schema.overlay(&declared);

        assert_eq!(schema.table_name(), Some("posts"));
        assert_eq!(schema.names(), ["id", "title", "created_at", "updated_at"]);
    }

    #[test]
    fn test_overlay_takes_column_shape_from_table() {
        let mut declared = Schema::new();
        declared.increments("id").primary();
        declared.string("headline").column("title");
        declared.integer("views");

        let mut table = Table::new();
        table.increments("id").primary();
        table.text("title").nullable();
        table.float("views");

        let mut schema = Schema::from_table(&table);
        schema.overlay(&declared);

        let headline = schema.get("headline").unwrap();
        assert_eq!(headline.get_column().name(), "title");
        assert_eq!(headline.get_column().column_type(), ColumnType::Text);
        assert!(headline.is_nullable());
        assert_eq!(schema.get("views").unwrap().get_column().column_type(), ColumnType::Float);
        assert_eq!(schema.primary_key().map(Property::name), Some("id"));
        assert!(!schema.has("title"));
    }
}
