//! Decorators shared by several resources.

use api_resource_loader::{DefinitionDecorator, ResourceDecorator, Schema, StoreDecorator, Table};

/// Adds a nullable `audited_by` column to the backing table.
#[derive(Debug, Default)]
pub struct Audited;

impl DefinitionDecorator for Audited {}

impl ResourceDecorator for Audited {}

impl StoreDecorator for Audited {
    fn decorate_model(&self, table: &mut Table) {
        table.string("audited_by").nullable();
    }
}

/// Exposes a `published` flag.
#[derive(Debug, Default)]
pub struct Publishable;

impl DefinitionDecorator for Publishable {}

impl ResourceDecorator for Publishable {
    fn decorate_schema(&self, schema: &mut Schema) {
        schema.boolean("published");
    }
}
