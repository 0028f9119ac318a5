//! # Transformers
//!
//! A [`Transformer`] turns a stored [`Record`] into its API representation.
//! Every resolved resource has one; [`IdentityTransformer`] is the fallback
//! when neither the registry nor the resource supplies one.

use crate::record::{Attributes, Record};
use crate::schema::Schema;
use std::sync::Arc;

pub trait Transformer: Send + Sync {
    fn transform(&self, record: &Record) -> Attributes;

    /// Name used in descriptors.
    fn label(&self) -> String {
        crate::convention::type_basename::<Self>().to_string()
    }
}

/// Returns records unchanged. Bound to the resource's schema.
#[derive(Debug, Clone)]
pub struct IdentityTransformer {
    schema: Arc<Schema>,
}

impl IdentityTransformer {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl Transformer for IdentityTransformer {
    fn transform(&self, record: &Record) -> Attributes {
        record.attributes().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_keeps_every_attribute() {
        let transformer = IdentityTransformer::new(Arc::new(Schema::new()));
        let mut record = Record::new();
        record.set_attribute("id", 3).set_attribute("secret", "x");

        let out = transformer.transform(&record);
        assert_eq!(out.get("id"), Some(&json!(3)));
        assert_eq!(out.get("secret"), Some(&json!("x")));
        assert_eq!(transformer.label(), "IdentityTransformer");
    }
}
