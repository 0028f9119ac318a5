//! # Decorators
//!
//! Reusable mutators applied to a definition without the resource knowing
//! about them. Capabilities are layered traits:
//!
//! - [`DefinitionDecorator`] edits the [`ResourceConfig`] at construction.
//! - [`ResourceDecorator`] also edits the resolved [`Schema`].
//! - [`StoreDecorator`] also edits the derived [`Table`] of a store-backed
//!   resource.
//!
//! A [`Decorator`] tags which capability a value was registered with, so the
//! pipeline dispatches each hook only to decorators that have it. Declaration
//! order is preserved at every stage; a later decorator sees what an earlier
//! one did.

use crate::config::ResourceConfig;
use crate::convention::type_basename;
use crate::schema::Schema;
use crate::table::Table;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::debug;

pub trait DefinitionDecorator: Send + Sync {
    fn label(&self) -> String {
        type_basename::<Self>().to_string()
    }

    fn decorate(&self, _config: &mut ResourceConfig) {}
}

pub trait ResourceDecorator: DefinitionDecorator {
    fn decorate_schema(&self, _schema: &mut Schema) {}
}

pub trait StoreDecorator: ResourceDecorator {
    fn decorate_model(&self, _table: &mut Table) {}
}

#[derive(Clone)]
pub enum Decorator {
    Definition(Arc<dyn DefinitionDecorator>),
    Resource(Arc<dyn ResourceDecorator>),
    Store(Arc<dyn StoreDecorator>),
}

impl Decorator {
    pub fn definition(decorator: impl DefinitionDecorator + 'static) -> Self {
        Decorator::Definition(Arc::new(decorator))
    }

    pub fn resource(decorator: impl ResourceDecorator + 'static) -> Self {
        Decorator::Resource(Arc::new(decorator))
    }

    pub fn store(decorator: impl StoreDecorator + 'static) -> Self {
        Decorator::Store(Arc::new(decorator))
    }

    pub fn label(&self) -> String {
        match self {
            Decorator::Definition(d) => d.label(),
            Decorator::Resource(d) => d.label(),
            Decorator::Store(d) => d.label(),
        }
    }

    fn decorate(&self, config: &mut ResourceConfig) {
        match self {
            Decorator::Definition(d) => d.decorate(config),
            Decorator::Resource(d) => d.decorate(config),
            Decorator::Store(d) => d.decorate(config),
        }
    }

    fn decorate_schema(&self, schema: &mut Schema) -> bool {
        match self {
            Decorator::Definition(_) => return false,
            Decorator::Resource(d) => d.decorate_schema(schema),
            Decorator::Store(d) => d.decorate_schema(schema),
        }
        true
    }

    fn decorate_model(&self, table: &mut Table) -> bool {
        match self {
            Decorator::Store(d) => d.decorate_model(table),
            _ => return false,
        }
        true
    }
}

impl Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Decorator::Definition(_) => "Definition",
            Decorator::Resource(_) => "Resource",
            Decorator::Store(_) => "Store",
        };
        write!(f, "{}({})", variant, self.label())
    }
}

/// Runs every decorator's `decorate` hook against the config.
///
/// The list is snapshotted first; decorators a hook adds are not run.
pub(crate) fn apply_definition(config: &mut ResourceConfig) {
    let decorators = config.decorators().to_vec();
    for decorator in &decorators {
        debug!(decorator = %decorator.label(), "Decorate definition");
        decorator.decorate(config);
    }
}

pub(crate) fn apply_schema(decorators: &[Decorator], schema: &mut Schema) {
    for decorator in decorators {
        if decorator.decorate_schema(schema) {
            debug!(decorator = %decorator.label(), "Decorate schema");
        }
    }
}

pub(crate) fn apply_model(decorators: &[Decorator], table: &mut Table) {
    for decorator in decorators {
        if decorator.decorate_model(table) {
            debug!(decorator = %decorator.label(), "Decorate model");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnType;

    struct Publishable;
    impl DefinitionDecorator for Publishable {}
    impl ResourceDecorator for Publishable {
        fn decorate_schema(&self, schema: &mut Schema) {
            schema.boolean("published");
        }
    }

    /// Only adds its column when `published` is already there.
    struct PublishedAt;
    impl DefinitionDecorator for PublishedAt {}
    impl ResourceDecorator for PublishedAt {
        fn decorate_schema(&self, schema: &mut Schema) {
            if schema.has("published") {
                schema.datetime("published_at").nullable();
            }
        }
    }

    struct Singleton;
    impl DefinitionDecorator for Singleton {
        fn decorate(&self, config: &mut ResourceConfig) {
            config.set_singleton(true);
        }
    }

    struct Audited;
    impl DefinitionDecorator for Audited {}
    impl ResourceDecorator for Audited {}
    impl StoreDecorator for Audited {
        fn decorate_model(&self, table: &mut Table) {
            table.string("audited_by").nullable();
        }
    }

    #[test]
    fn test_schema_hooks_run_in_order() {
        let mut schema = Schema::new();
        apply_schema(
            &[Decorator::resource(Publishable), Decorator::resource(PublishedAt)],
            &mut schema,
        );
        assert_eq!(schema.names(), ["published", "published_at"]);

        let mut reversed = Schema::new();
        apply_schema(
            &[Decorator::resource(PublishedAt), Decorator::resource(Publishable)],
            &mut reversed,
        );
        assert_eq!(reversed.names(), ["published"]);
    }

    #[test]
    fn test_model_hook_only_reaches_store_decorators() {
        let decorators = [
            Decorator::definition(Singleton),
            Decorator::resource(Publishable),
            Decorator::store(Audited),
        ];
        let mut table = Table::new();
        apply_model(&decorators, &mut table);
        assert_eq!(table.columns().len(), 1);
        assert_eq!(
            table.get("audited_by").map(|c| c.column_type()),
            Some(ColumnType::String)
        );
    }

    #[test]
    fn test_definition_hook_edits_config() {
        let mut config = ResourceConfig::builder("Settings")
            .decorate(Decorator::definition(Singleton))
            .build();
        assert!(!config.singleton());
        apply_definition(&mut config);
        assert!(config.singleton());
        assert_eq!(format!("{:?}", config.decorators()[0]), "Definition(Singleton)");
    }
}
