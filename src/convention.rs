//! # Naming Conventions
//!
//! Pure functions that derive names from a resource's declared type name:
//! default endpoints, factory lookup keys, relation override keys and the
//! default keys used by nested relations.
//!
//! Nothing here touches a definition or its cache, so every function is
//! deterministic for a given input.

use crate::pluralize::Pluralizer;
use crate::relation::RelationKind;
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Returns the bare type name of `T` (e.g. `BlogPost` instead of `app::resources::BlogPost`).
pub fn type_basename<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Default endpoint for a type name: kebab-case plural (`BlogPost` -> `blog-posts`).
pub fn default_endpoint(type_name: &str) -> String {
    Pluralizer::pluralize(&type_name.to_kebab_case())
}

/// Default factory lookup key for a type name: lowerCamel (`BlogPost` -> `blogPost`).
pub fn lookup_key(type_name: &str) -> String {
    type_name.to_lower_camel_case()
}

/// Key of the override consulted for a relation without an explicit binder
/// (`belongs_to` + `author` -> `belongsToAuthor`).
pub fn relation_override_key(kind: RelationKind, name: &str) -> String {
    format!("{}{}", kind.method_prefix(), name.to_upper_camel_case())
}

/// Collection a singular relation name refers to (`author` -> `authors`).
pub fn relation_target(name: &str) -> String {
    Pluralizer::pluralize(name)
}

/// Foreign key nested resources use to point at their owner (`orders` -> `order_id`).
pub fn nest_foreign_key(owner_endpoint: &str) -> String {
    format!("{}_id", Pluralizer::singularize(owner_endpoint)).to_snake_case()
}

/// Default storage table name for an endpoint (`blog-posts` -> `blog_posts`).
pub fn table_name(endpoint: &str) -> String {
    endpoint.to_snake_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BlogPost;

    #[test]
    fn test_type_basename_strips_module_path() {
        assert_eq!(type_basename::<BlogPost>(), "BlogPost");
        assert_eq!(type_basename::<Vec<BlogPost>>(), "Vec");
    }

    #[test]
    fn test_default_endpoint_is_kebab_plural() {
        assert_eq!(default_endpoint("BlogPost"), "blog-posts");
        assert_eq!(default_endpoint("Category"), "categories");
        assert_eq!(default_endpoint("Order"), "orders");
        assert_eq!(default_endpoint("Stats"), "stats");
        assert_eq!(default_endpoint("Movie"), "movies");
    }

    #[test]
    fn test_lookup_key_is_lower_camel() {
        assert_eq!(lookup_key("BlogPost"), "blogPost");
        assert_eq!(lookup_key("Author"), "author");
    }

    #[test]
    fn test_relation_override_key() {
        assert_eq!(
            relation_override_key(RelationKind::BelongsTo, "author"),
            "belongsToAuthor"
        );
        assert_eq!(
            relation_override_key(RelationKind::HasMany, "order_items"),
            "hasManyOrderItems"
        );
        assert_eq!(relation_override_key(RelationKind::Nest, "items"), "nestItems");
    }

    #[test]
    fn test_nest_foreign_key_uses_singular_owner() {
        assert_eq!(nest_foreign_key("orders"), "order_id");
        assert_eq!(nest_foreign_key("blog-posts"), "blog_post_id");
        assert_eq!(nest_foreign_key("categories"), "category_id");
        assert_eq!(nest_foreign_key("movies"), "movie_id");
        assert_eq!(nest_foreign_key("sizes"), "size_id");
        assert_eq!(nest_foreign_key("warehouses"), "warehouse_id");
        assert_eq!(nest_foreign_key("caches"), "cache_id");
        assert_eq!(nest_foreign_key("cookies"), "cookie_id");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("blog-posts"), "blog_posts");
    }
}
