//! # Wired Resources
//!
//! [`ApiResource`] is what a host receives from a build: every resolved
//! artifact of one definition, plus the projection lists and relations.

use crate::listener::ListenerRegistry;
use crate::record::{Attributes, Record};
use crate::relation::{RelationBinding, RelationKind, ResolvedRelation};
use crate::repository::Repository;
use crate::schema::Schema;
use crate::table::ColumnType;
use crate::transformer::Transformer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceShape {
    Collection,
    Singleton,
}

pub struct ApiResource {
    endpoint: String,
    shape: ResourceShape,
    schema: Arc<Schema>,
    repository: Option<Arc<dyn Repository>>,
    transformer: Arc<dyn Transformer>,
    only: Vec<String>,
    except: Vec<String>,
    relations: Vec<ResolvedRelation>,
    listeners: Option<ListenerRegistry>,
}

impl ApiResource {
    pub fn new(
        endpoint: impl Into<String>,
        shape: ResourceShape,
        schema: Arc<Schema>,
        repository: Option<Arc<dyn Repository>>,
        transformer: Arc<dyn Transformer>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            shape,
            schema,
            repository,
            transformer,
            only: Vec::new(),
            except: Vec::new(),
            relations: Vec::new(),
            listeners: None,
        }
    }

    pub fn only(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.only.extend(fields);
        self
    }

    pub fn except(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.except.extend(fields);
        self
    }

    pub fn relate(mut self, relation: ResolvedRelation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_listeners(mut self, listeners: ListenerRegistry) -> Self {
        self.listeners = Some(listeners);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn shape(&self) -> ResourceShape {
        self.shape
    }

    pub fn is_singleton(&self) -> bool {
        self.shape == ResourceShape::Singleton
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn repository(&self) -> Option<&Arc<dyn Repository>> {
        self.repository.as_ref()
    }

    pub fn transformer(&self) -> &Arc<dyn Transformer> {
        &self.transformer
    }

    pub fn included(&self) -> &[String] {
        &self.only
    }

    pub fn excluded(&self) -> &[String] {
        &self.except
    }

    pub fn relations(&self) -> &[ResolvedRelation] {
        &self.relations
    }

    pub fn relation(&self, kind: RelationKind, name: &str) -> Option<&ResolvedRelation> {
        self.relations
            .iter()
            .find(|r| r.kind == kind && r.name == name)
    }

    pub fn listeners(&self) -> Option<&ListenerRegistry> {
        self.listeners.as_ref()
    }

    fn is_visible(&self, field: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|f| f == field))
            && !self.except.iter().any(|f| f == field)
    }

    /// Schema fields that survive the include and exclude lists.
    pub fn fields(&self) -> Vec<&str> {
        self.schema
            .names()
            .into_iter()
            .filter(|name| self.is_visible(name))
            .collect()
    }

    /// Transforms a record and applies the include and exclude lists.
    pub fn project(&self, record: &Record) -> Attributes {
        let mut attributes = self.transformer.transform(record);
        attributes.retain(|key, _| self.is_visible(key));
        attributes
    }

    pub fn describe(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            endpoint: self.endpoint.clone(),
            shape: self.shape,
            table: self.schema.table_name().map(str::to_string),
            fields: self
                .schema
                .properties()
                .iter()
                .filter(|p| self.is_visible(p.name()))
                .map(|p| FieldDescriptor {
                    name: p.name().to_string(),
                    column: p.get_column().name().to_string(),
                    column_type: p.get_column().column_type(),
                    primary: p.get_column().is_primary(),
                    nullable: p.is_nullable(),
                })
                .collect(),
            has_repository: self.repository.is_some(),
            transformer: self.transformer.label(),
            only: self.only.clone(),
            except: self.except.clone(),
            relations: self
                .relations
                .iter()
                .map(|r| RelationDescriptor {
                    kind: r.kind,
                    name: r.name.clone(),
                    binding: r.binding(),
                })
                .collect(),
            listeners: self.listeners.as_ref().map(|registry| {
                registry
                    .by_event()
                    .into_iter()
                    .map(|(event, refs)| {
                        (
                            event.as_str().to_string(),
                            refs.iter().map(|r| r.label()).collect(),
                        )
                    })
                    .collect()
            }),
        }
    }
}

impl Debug for ApiResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResource")
            .field("endpoint", &self.endpoint)
            .field("shape", &self.shape)
            .field("fields", &self.fields())
            .field("repository", &self.repository.is_some())
            .field("transformer", &self.transformer.label())
            .field("relations", &self.relations.len())
            .finish()
    }
}

/// Serializable summary of a wired resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    pub endpoint: String,
    pub shape: ResourceShape,
    pub table: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub has_repository: bool,
    pub transformer: String,
    pub only: Vec<String>,
    pub except: Vec<String>,
    pub relations: Vec<RelationDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listeners: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub column: String,
    pub column_type: ColumnType,
    pub primary: bool,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationDescriptor {
    pub kind: RelationKind,
    pub name: String,
    pub binding: Option<RelationBinding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::IdentityTransformer;
    use serde_json::json;

    fn user_resource() -> ApiResource {
        let mut schema = Schema::new();
        schema.table("users");
        schema.increments("id").primary();
        schema.string("name");
        schema.string("password");
        let schema = Arc::new(schema);
        let transformer = Arc::new(IdentityTransformer::new(schema.clone()));
        ApiResource::new("users", ResourceShape::Collection, schema, None, transformer)
    }

    #[test]
    fn test_except_hides_fields() {
        let resource = user_resource().except(["password".to_string()]);
        assert_eq!(resource.fields(), ["id", "name"]);

        let mut record = Record::new();
        record
            .set_attribute("id", 1)
            .set_attribute("name", "Ada")
            .set_attribute("password", "hunter2");
        let projected = resource.project(&record);
        assert_eq!(projected.get("name"), Some(&json!("Ada")));
        assert!(projected.get("password").is_none());
    }

    #[test]
    fn test_only_limits_fields() {
        let resource = user_resource().only(["name".to_string()]);
        assert_eq!(resource.fields(), ["name"]);
    }

    #[test]
    fn test_descriptor_serializes() {
        let descriptor = user_resource().describe();
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["endpoint"], json!("users"));
        assert_eq!(value["shape"], json!("collection"));
        assert_eq!(value["fields"][0]["column_type"], json!("increments"));
        assert_eq!(value["has_repository"], json!(false));
        assert!(value.get("listeners").is_none());
    }
}
