//! # Relations
//!
//! Resources declare relations in four kinds. Each entry is a name and an
//! optional [`Binder`]; [`resolve_relation`] fills in a missing binder from a
//! resource override or from the naming convention of its kind.

use crate::convention::{nest_foreign_key, relation_override_key, relation_target};
use serde::Serialize;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    BelongsTo,
    HasMany,
    HasOne,
    Nest,
}

impl RelationKind {
    /// Resolution and wiring order.
    pub const ALL: [RelationKind; 4] = [
        RelationKind::BelongsTo,
        RelationKind::HasMany,
        RelationKind::HasOne,
        RelationKind::Nest,
    ];

    /// Prefix of the override key, e.g. `belongsTo` in `belongsToAuthor`.
    pub fn method_prefix(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongsTo",
            RelationKind::HasMany => "hasMany",
            RelationKind::HasOne => "hasOne",
            RelationKind::Nest => "nest",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_prefix())
    }
}

/// What a binder configured: target resource and join keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationBinding {
    pub target: Option<String>,
    pub local_key: Option<String>,
    pub foreign_key: Option<String>,
}

/// Capability handed to a binder.
#[derive(Debug, Default)]
pub struct RelationBuilder {
    binding: RelationBinding,
}

impl RelationBuilder {
    pub fn bind(&mut self, target: impl Into<String>) -> &mut Self {
        self.binding.target = Some(target.into());
        self
    }

    pub fn local_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.binding.local_key = Some(key.into());
        self
    }

    pub fn foreign_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.binding.foreign_key = Some(key.into());
        self
    }

    pub fn into_binding(self) -> RelationBinding {
        self.binding
    }
}

/// A pure function configuring a relation.
#[derive(Clone)]
pub struct Binder(Arc<dyn Fn(&mut RelationBuilder) + Send + Sync>);

impl Binder {
    pub fn new(f: impl Fn(&mut RelationBuilder) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, builder: &mut RelationBuilder) {
        (self.0)(builder)
    }

    /// Runs the binder against a fresh builder.
    pub fn describe(&self) -> RelationBinding {
        let mut builder = RelationBuilder::default();
        self.apply(&mut builder);
        builder.into_binding()
    }
}

impl Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binder").field(&self.describe()).finish()
    }
}

/// A declared relation.
#[derive(Debug, Clone)]
pub struct RelationEntry {
    pub name: String,
    pub binder: Option<Binder>,
}

impl From<&str> for RelationEntry {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            binder: None,
        }
    }
}

impl From<String> for RelationEntry {
    fn from(name: String) -> Self {
        Self { name, binder: None }
    }
}

impl From<(&str, Binder)> for RelationEntry {
    fn from((name, binder): (&str, Binder)) -> Self {
        Self {
            name: name.to_string(),
            binder: Some(binder),
        }
    }
}

/// A relation after resolution. `binder` is `None` only for a has-many
/// relation nobody configured.
#[derive(Debug, Clone)]
pub struct ResolvedRelation {
    pub kind: RelationKind,
    pub name: String,
    pub binder: Option<Binder>,
}

impl ResolvedRelation {
    pub fn binding(&self) -> Option<RelationBinding> {
        self.binder.as_ref().map(Binder::describe)
    }
}

/// Declared relations, one ordered list per kind.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    belongs_to: Vec<RelationEntry>,
    has_many: Vec<RelationEntry>,
    has_one: Vec<RelationEntry>,
    nest: Vec<RelationEntry>,
}

impl Relations {
    pub fn push(&mut self, kind: RelationKind, entry: RelationEntry) {
        self.entries_mut(kind).push(entry);
    }

    pub fn entries(&self, kind: RelationKind) -> &[RelationEntry] {
        match kind {
            RelationKind::BelongsTo => &self.belongs_to,
            RelationKind::HasMany => &self.has_many,
            RelationKind::HasOne => &self.has_one,
            RelationKind::Nest => &self.nest,
        }
    }

    fn entries_mut(&mut self, kind: RelationKind) -> &mut Vec<RelationEntry> {
        match kind {
            RelationKind::BelongsTo => &mut self.belongs_to,
            RelationKind::HasMany => &mut self.has_many,
            RelationKind::HasOne => &mut self.has_one,
            RelationKind::Nest => &mut self.nest,
        }
    }

    /// All entries in kind order, then declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (RelationKind, &RelationEntry)> {
        RelationKind::ALL
            .into_iter()
            .flat_map(move |kind| self.entries(kind).iter().map(move |entry| (kind, entry)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Resolves one relation entry.
///
/// An explicit binder wins. Otherwise `lookup` is asked for an override under
/// `kind + UpperCamel(name)`. Otherwise the kind's convention applies:
/// belongs-to and has-one bind the pluralized name, nest binds `id` to the
/// owner's singular foreign key, has-many stays unbound.
pub fn resolve_relation<F>(
    kind: RelationKind,
    entry: &RelationEntry,
    owner_endpoint: &str,
    lookup: F,
) -> ResolvedRelation
where
    F: Fn(&str) -> Option<Binder>,
{
    let name = entry.name.clone();
    if let Some(binder) = &entry.binder {
        return ResolvedRelation {
            kind,
            name,
            binder: Some(binder.clone()),
        };
    }

    let key = relation_override_key(kind, &name);
    if let Some(binder) = lookup(&key) {
        debug!(%kind, relation = %name, %key, "Relation override");
        return ResolvedRelation {
            kind,
            name,
            binder: Some(binder),
        };
    }

    let binder = match kind {
        RelationKind::BelongsTo | RelationKind::HasOne => {
            let target = relation_target(&name);
            Some(Binder::new(move |relation| {
                relation.bind(target.clone());
            }))
        }
        RelationKind::Nest => {
            let foreign_key = nest_foreign_key(owner_endpoint);
            Some(Binder::new(move |relation| {
                relation.local_key("id").foreign_key(foreign_key.clone());
            }))
        }
        RelationKind::HasMany => None,
    };
    ResolvedRelation { kind, name, binder }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides(_: &str) -> Option<Binder> {
        None
    }

    #[test]
    fn test_belongs_to_binds_plural() {
        let resolved = resolve_relation(
            RelationKind::BelongsTo,
            &"author".into(),
            "posts",
            no_overrides,
        );
        assert_eq!(resolved.binding().unwrap().target.as_deref(), Some("authors"));
    }

    #[test]
    fn test_nest_uses_owner_foreign_key() {
        let resolved = resolve_relation(RelationKind::Nest, &"items".into(), "orders", no_overrides);
        let binding = resolved.binding().unwrap();
        assert_eq!(binding.local_key.as_deref(), Some("id"));
        assert_eq!(binding.foreign_key.as_deref(), Some("order_id"));
        assert_eq!(binding.target, None);
    }

    #[test]
    fn test_has_many_without_override_is_unbound() {
        let resolved = resolve_relation(
            RelationKind::HasMany,
            &"comments".into(),
            "posts",
            no_overrides,
        );
        assert!(resolved.binder.is_none());
    }

    #[test]
    fn test_override_then_explicit_precedence() {
        let lookup = |key: &str| {
            (key == "hasOneProfile").then(|| Binder::new(|r| {
                r.bind("user-profiles");
            }))
        };
        let resolved = resolve_relation(RelationKind::HasOne, &"profile".into(), "users", lookup);
        assert_eq!(
            resolved.binding().unwrap().target.as_deref(),
            Some("user-profiles")
        );

        let explicit: RelationEntry = (
            "profile",
            Binder::new(|r| {
                r.bind("bios");
            }),
        )
            .into();
        let resolved = resolve_relation(RelationKind::HasOne, &explicit, "users", lookup);
        assert_eq!(resolved.binding().unwrap().target.as_deref(), Some("bios"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = resolve_relation(RelationKind::BelongsTo, &"category".into(), "posts", no_overrides);
        let b = resolve_relation(RelationKind::BelongsTo, &"category".into(), "posts", no_overrides);
        assert_eq!(a.binding(), b.binding());
        assert_eq!(a.binding().unwrap().target.as_deref(), Some("categories"));
    }

    #[test]
    fn test_relations_iterate_in_kind_order() {
        let mut relations = Relations::default();
        relations.push(RelationKind::Nest, "items".into());
        relations.push(RelationKind::BelongsTo, "customer".into());
        relations.push(RelationKind::HasMany, "payments".into());

        let names: Vec<_> = relations.iter().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(names, ["customer", "payments", "items"]);
    }
}
