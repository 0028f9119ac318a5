//! Listeners registered by name with the loader's registry.

use api_resource_loader::{Event, Listener};
use heck::ToKebabCase;
use serde_json::Value;

/// Fills `slug` from `title` when a record is created without one.
#[derive(Debug, Default)]
pub struct Slugger;

impl Listener for Slugger {
    fn creating(&self, event: &mut Event) {
        let Some(record) = event.record_mut() else {
            return;
        };
        if record.is_set("slug") {
            return;
        }
        if let Some(title) = record.get("title").and_then(Value::as_str) {
            let slug = title.to_kebab_case();
            record.set_attribute("slug", slug);
        }
    }
}
