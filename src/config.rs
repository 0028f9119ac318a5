//! # Resource Configuration
//!
//! [`ResourceConfig`] is the declaration of one resource: endpoint, shape,
//! named overrides, projection lists, relations, listeners, decorators and
//! storage flags. It is built once through [`ResourceConfigBuilder`], edited
//! by decorators during construction, and read-only afterwards (the
//! definition only hands out shared references).

use crate::convention::{default_endpoint, lookup_key};
use crate::decorator::Decorator;
use crate::listener::{ListenerBinding, ListenerRef};
use crate::model::ModelEvent;
use crate::relation::{Binder, RelationEntry, RelationKind, Relations};

#[derive(Debug, Clone)]
pub struct ResourceConfig {
    type_name: String,
    endpoint: Option<String>,
    singleton: bool,
    schema_ref: Option<String>,
    repository_ref: Option<String>,
    transformer_ref: Option<String>,
    model_ref: Option<String>,
    only: Vec<String>,
    except: Vec<String>,
    relations: Relations,
    listeners: Vec<ListenerBinding>,
    decorators: Vec<Decorator>,
    timestamps: bool,
    soft_deletes: bool,
}

impl ResourceConfig {
    pub fn builder(type_name: impl Into<String>) -> ResourceConfigBuilder {
        ResourceConfigBuilder {
            config: ResourceConfig {
                type_name: type_name.into(),
                endpoint: None,
                singleton: false,
                schema_ref: None,
                repository_ref: None,
                transformer_ref: None,
                model_ref: None,
                only: Vec::new(),
                except: Vec::new(),
                relations: Relations::default(),
                listeners: Vec::new(),
                decorators: Vec::new(),
                timestamps: true,
                soft_deletes: false,
            },
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Explicit endpoint, else the kebab-case plural of the type name.
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(&self.type_name))
    }

    pub fn singleton(&self) -> bool {
        self.singleton
    }

    /// Key used to look up a schema in the schema factory.
    pub fn schema_key(&self) -> String {
        self.schema_ref
            .clone()
            .unwrap_or_else(|| lookup_key(&self.type_name))
    }

    /// Key used to look up a model in the model factory.
    pub fn model_key(&self) -> String {
        self.model_ref
            .clone()
            .unwrap_or_else(|| lookup_key(&self.type_name))
    }

    pub fn repository_ref(&self) -> Option<&str> {
        self.repository_ref.as_deref()
    }

    pub fn transformer_ref(&self) -> Option<&str> {
        self.transformer_ref.as_deref()
    }

    pub fn only(&self) -> &[String] {
        &self.only
    }

    pub fn except(&self) -> &[String] {
        &self.except
    }

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn listeners(&self) -> &[ListenerBinding] {
        &self.listeners
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    pub fn soft_deletes(&self) -> bool {
        self.soft_deletes
    }

    // Decorator-facing mutators.

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn set_singleton(&mut self, singleton: bool) -> &mut Self {
        self.singleton = singleton;
        self
    }

    pub fn set_timestamps(&mut self, enabled: bool) -> &mut Self {
        self.timestamps = enabled;
        self
    }

    pub fn set_soft_deletes(&mut self, enabled: bool) -> &mut Self {
        self.soft_deletes = enabled;
        self
    }

    pub fn include(&mut self, field: impl Into<String>) -> &mut Self {
        push_unique(&mut self.only, field.into());
        self
    }

    pub fn exclude(&mut self, field: impl Into<String>) -> &mut Self {
        push_unique(&mut self.except, field.into());
        self
    }

    pub fn relate(&mut self, kind: RelationKind, entry: impl Into<RelationEntry>) -> &mut Self {
        self.relations.push(kind, entry.into());
        self
    }

    pub fn listen(&mut self, binding: ListenerBinding) -> &mut Self {
        self.listeners.push(binding);
        self
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Fluent builder handed to [`Resource::configure`](crate::definition::Resource::configure).
#[derive(Debug, Clone)]
pub struct ResourceConfigBuilder {
    config: ResourceConfig,
}

impl ResourceConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    pub fn singleton(mut self) -> Self {
        self.config.singleton = true;
        self
    }

    /// Schema factory key, overriding the lower-camel type name.
    pub fn schema(mut self, key: impl Into<String>) -> Self {
        self.config.schema_ref = Some(key.into());
        self
    }

    /// Name of a repository factory in the [`Registry`](crate::factory::Registry).
    pub fn repository(mut self, name: impl Into<String>) -> Self {
        self.config.repository_ref = Some(name.into());
        self
    }

    /// Name of a transformer factory in the [`Registry`](crate::factory::Registry).
    pub fn transformer(mut self, name: impl Into<String>) -> Self {
        self.config.transformer_ref = Some(name.into());
        self
    }

    /// Model factory key, overriding the lower-camel type name.
    pub fn model(mut self, key: impl Into<String>) -> Self {
        self.config.model_ref = Some(key.into());
        self
    }

    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            push_unique(&mut self.config.only, field.into());
        }
        self
    }

    pub fn except<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            push_unique(&mut self.config.except, field.into());
        }
        self
    }

    pub fn belongs_to(self, name: &str) -> Self {
        self.relation(RelationKind::BelongsTo, name.into())
    }

    pub fn has_many(self, name: &str) -> Self {
        self.relation(RelationKind::HasMany, name.into())
    }

    pub fn has_one(self, name: &str) -> Self {
        self.relation(RelationKind::HasOne, name.into())
    }

    pub fn nest(self, name: &str) -> Self {
        self.relation(RelationKind::Nest, name.into())
    }

    pub fn belongs_to_with(self, name: &str, binder: Binder) -> Self {
        self.relation(RelationKind::BelongsTo, (name, binder).into())
    }

    pub fn has_many_with(self, name: &str, binder: Binder) -> Self {
        self.relation(RelationKind::HasMany, (name, binder).into())
    }

    pub fn has_one_with(self, name: &str, binder: Binder) -> Self {
        self.relation(RelationKind::HasOne, (name, binder).into())
    }

    pub fn nest_with(self, name: &str, binder: Binder) -> Self {
        self.relation(RelationKind::Nest, (name, binder).into())
    }

    fn relation(mut self, kind: RelationKind, entry: RelationEntry) -> Self {
        self.config.relations.push(kind, entry);
        self
    }

    /// Registers a listener for one event.
    pub fn listen(self, event: ModelEvent, listener: ListenerRef) -> Self {
        self.listen_all([event], listener)
    }

    /// Registers a listener once for several events.
    pub fn listen_all(
        mut self,
        events: impl IntoIterator<Item = ModelEvent>,
        listener: ListenerRef,
    ) -> Self {
        self.config
            .listeners
            .push(ListenerBinding::new(listener, events));
        self
    }

    pub fn decorate(mut self, decorator: Decorator) -> Self {
        self.config.decorators.push(decorator);
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.config.timestamps = enabled;
        self
    }

    pub fn soft_deletes(mut self, enabled: bool) -> Self {
        self.config.soft_deletes = enabled;
        self
    }

    pub fn build(self) -> ResourceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_type_name() {
        let config = ResourceConfig::builder("BlogPost").build();
        assert_eq!(config.endpoint(), "blog-posts");
        assert_eq!(config.schema_key(), "blogPost");
        assert_eq!(config.model_key(), "blogPost");
        assert!(config.timestamps());
        assert!(!config.soft_deletes());
        assert!(!config.singleton());
    }

    #[test]
    fn test_overrides_win() {
        let config = ResourceConfig::builder("BlogPost")
            .endpoint("articles")
            .schema("article")
            .model("articleModel")
            .repository("articles")
            .build();
        assert_eq!(config.endpoint(), "articles");
        assert_eq!(config.schema_key(), "article");
        assert_eq!(config.model_key(), "articleModel");
        assert_eq!(config.repository_ref(), Some("articles"));
    }

    #[test]
    fn test_projection_lists_keep_order_without_duplicates() {
        let mut config = ResourceConfig::builder("User")
            .except(["password", "token", "password"])
            .build();
        config.exclude("token").exclude("salt");
        assert_eq!(config.except(), ["password", "token", "salt"]);
        assert!(config.only().is_empty());
    }

    #[test]
    fn test_listeners_keep_declaration_order() {
        let config = ResourceConfig::builder("Order")
            .listen(ModelEvent::Creating, ListenerRef::named("audit"))
            .listen_all(ModelEvent::ALL, ListenerRef::named("metrics"))
            .build();
        let labels: Vec<_> = config
            .listeners()
            .iter()
            .map(|b| b.listener.label())
            .collect();
        assert_eq!(labels, ["audit", "metrics"]);
        assert_eq!(config.listeners()[1].events.len(), 4);
    }
}
