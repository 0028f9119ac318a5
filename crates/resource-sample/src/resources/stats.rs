use api_resource_loader::{Attributes, Record, Resource, ResourceConfigBuilder, Schema, Transformer};
use serde_json::Value;
use std::sync::Arc;

/// Site statistics. Computed, so it has no repository.
#[derive(Debug, Default)]
pub struct Stats;

impl Resource for Stats {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config.endpoint("stats").singleton()
    }

    fn schema(&self, schema: &mut Schema) {
        schema.integer("posts");
        schema.integer("comments");
        schema.float("comments_per_post");
    }

    fn transformer(&self, _schema: &Arc<Schema>) -> Option<Arc<dyn Transformer>> {
        Some(Arc::new(StatsTransformer))
    }
}

/// Adds `comments_per_post` from the raw counts.
#[derive(Debug)]
pub struct StatsTransformer;

impl Transformer for StatsTransformer {
    fn transform(&self, record: &Record) -> Attributes {
        let mut attributes = record.attributes().clone();
        let count = |key: &str| record.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        let posts = count("posts");
        let ratio = if posts > 0.0 { count("comments") / posts } else { 0.0 };
        attributes.insert("comments_per_post".to_string(), Value::from(ratio));
        attributes
    }
}
