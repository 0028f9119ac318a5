//! # Model Listeners
//!
//! Listeners react to storage events ([`ModelEvent`]). Two are built in:
//!
//! - [`HandleTimestamps`] stamps `created_at` / `updated_at` on writes.
//! - [`HandleSoftDeletes`] hides deleted records from top-level fetches and
//!   turns deletes into a `deleted_at` stamp.
//!
//! [`ListenerRegistry::resolve`] merges the built-ins with the listeners a
//! resource declares. Order is fixed: timestamps, then soft deletes, then user
//! listeners in declaration order. A user listener that reads a stamped
//! timestamp relies on running after [`HandleTimestamps`].

use crate::convention::type_basename;
use crate::error::{ResolveError, ResolveResult};
use crate::factory::Registry;
use crate::model::{Event, Model, ModelEvent};
use crate::record::Condition;
use crate::table::{CREATED_AT, DELETED_AT, UPDATED_AT};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::debug;

/// Storage timestamp format (`2024-05-01 13:37:00`, UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Reacts to storage events. Every hook defaults to a no-op.
pub trait Listener: Send + Sync {
    /// Name used in logs and descriptors.
    fn label(&self) -> String {
        type_basename::<Self>().to_string()
    }

    fn fetching(&self, _event: &mut Event) {}

    fn creating(&self, _event: &mut Event) {}

    fn updating(&self, _event: &mut Event) {}

    fn deleting(&self, _event: &mut Event) {}

    /// Routes the event to the hook matching its kind.
    fn handle(&self, event: &mut Event) {
        match event.kind() {
            ModelEvent::Fetching => self.fetching(event),
            ModelEvent::Creating => self.creating(event),
            ModelEvent::Updating => self.updating(event),
            ModelEvent::Deleting => self.deleting(event),
        }
    }
}

/// Stamps creation and update times.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandleTimestamps;

impl HandleTimestamps {
    pub const EVENTS: [ModelEvent; 2] = [ModelEvent::Creating, ModelEvent::Updating];
}

impl Listener for HandleTimestamps {
    fn creating(&self, event: &mut Event) {
        if let Some(record) = event.record_mut() {
            let now = timestamp_now();
            if !record.is_set(CREATED_AT) {
                record.set_attribute(CREATED_AT, now.clone());
            }
            if !record.is_set(UPDATED_AT) {
                record.set_attribute(UPDATED_AT, now);
            }
        }
    }

    fn updating(&self, event: &mut Event) {
        if let Some(record) = event.record_mut() {
            record.set_attribute(UPDATED_AT, timestamp_now());
        }
    }
}

/// Scopes top-level fetches to live records and replaces deletes with a marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandleSoftDeletes;

impl HandleSoftDeletes {
    pub const EVENTS: [ModelEvent; 2] = [ModelEvent::Fetching, ModelEvent::Deleting];
}

impl Listener for HandleSoftDeletes {
    fn fetching(&self, event: &mut Event) {
        if event.is_via_relation() {
            return;
        }
        if let Some(query) = event.query_mut() {
            query.push(Condition::IsNull(DELETED_AT.to_string()));
        }
    }

    fn deleting(&self, event: &mut Event) {
        event.prevent_default();
        if let Some(record) = event.record_mut() {
            record.set_attribute(DELETED_AT, timestamp_now());
        }
        event.save();
    }
}

/// Reference to a listener, instantiated when a model is built.
#[derive(Clone)]
pub enum ListenerRef {
    Timestamps,
    SoftDeletes,
    /// Looked up in the [`Registry`] by name.
    Named(String),
    Instance(Arc<dyn Listener>),
}

impl ListenerRef {
    pub fn named(name: impl Into<String>) -> Self {
        ListenerRef::Named(name.into())
    }

    pub fn instance(listener: impl Listener + 'static) -> Self {
        ListenerRef::Instance(Arc::new(listener))
    }

    pub fn label(&self) -> String {
        match self {
            ListenerRef::Timestamps => HandleTimestamps.label(),
            ListenerRef::SoftDeletes => HandleSoftDeletes.label(),
            ListenerRef::Named(name) => name.clone(),
            ListenerRef::Instance(listener) => listener.label(),
        }
    }

    pub fn instantiate(&self, registry: &Registry) -> ResolveResult<Arc<dyn Listener>> {
        match self {
            ListenerRef::Timestamps => Ok(Arc::new(HandleTimestamps)),
            ListenerRef::SoftDeletes => Ok(Arc::new(HandleSoftDeletes)),
            ListenerRef::Named(name) => registry
                .listener(name)
                .map(|factory| factory())
                .ok_or_else(|| ResolveError::UnknownListener(name.clone())),
            ListenerRef::Instance(listener) => Ok(Arc::clone(listener)),
        }
    }
}

impl Debug for ListenerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A listener together with the events it is registered for.
#[derive(Debug, Clone)]
pub struct ListenerBinding {
    pub listener: ListenerRef,
    pub events: Vec<ModelEvent>,
}

impl ListenerBinding {
    pub fn new(listener: ListenerRef, events: impl IntoIterator<Item = ModelEvent>) -> Self {
        Self {
            listener,
            events: events.into_iter().collect(),
        }
    }
}

/// Ordered listener registrations of one store-backed resource.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    bindings: Vec<ListenerBinding>,
}

impl ListenerRegistry {
    /// Merges built-in listeners with the declared ones.
    pub fn resolve(timestamps: bool, soft_deletes: bool, declared: &[ListenerBinding]) -> Self {
        let mut bindings = Vec::with_capacity(declared.len() + 2);
        if timestamps {
            bindings.push(ListenerBinding::new(
                ListenerRef::Timestamps,
                HandleTimestamps::EVENTS,
            ));
        }
        if soft_deletes {
            bindings.push(ListenerBinding::new(
                ListenerRef::SoftDeletes,
                HandleSoftDeletes::EVENTS,
            ));
        }
        bindings.extend(declared.iter().cloned());
        Self { bindings }
    }

    pub fn bindings(&self) -> &[ListenerBinding] {
        &self.bindings
    }

    /// Listeners in registration order.
    pub fn ordered(&self) -> Vec<&ListenerRef> {
        self.bindings.iter().map(|b| &b.listener).collect()
    }

    pub fn for_event(&self, event: ModelEvent) -> Vec<&ListenerRef> {
        self.bindings
            .iter()
            .filter(|b| b.events.contains(&event))
            .map(|b| &b.listener)
            .collect()
    }

    /// Event -> listeners, each list in registration order.
    pub fn by_event(&self) -> BTreeMap<ModelEvent, Vec<ListenerRef>> {
        let mut map: BTreeMap<ModelEvent, Vec<ListenerRef>> = BTreeMap::new();
        for binding in &self.bindings {
            for event in &binding.events {
                map.entry(*event).or_default().push(binding.listener.clone());
            }
        }
        map
    }

    /// Instantiates each listener once and registers it on the model for its events.
    pub fn attach(&self, model: &mut Model, registry: &Registry) -> ResolveResult<()> {
        for binding in &self.bindings {
            let listener = binding.listener.instantiate(registry)?;
            for event in &binding.events {
                debug!(listener = %binding.listener.label(), %event, "Listener attached");
                model.listen(*event, Arc::clone(&listener));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Query, Record};

    struct AuditLog;
    impl Listener for AuditLog {}

    fn labels(refs: Vec<&ListenerRef>) -> Vec<String> {
        refs.into_iter().map(ListenerRef::label).collect()
    }

    #[test]
    fn test_builtins_precede_user_listeners() {
        let declared = [ListenerBinding::new(
            ListenerRef::instance(AuditLog),
            ModelEvent::ALL,
        )];
        let registry = ListenerRegistry::resolve(true, true, &declared);

        assert_eq!(
            labels(registry.ordered()),
            ["HandleTimestamps", "HandleSoftDeletes", "AuditLog"]
        );
        assert_eq!(
            labels(registry.for_event(ModelEvent::Creating)),
            ["HandleTimestamps", "AuditLog"]
        );
        assert_eq!(
            labels(registry.for_event(ModelEvent::Deleting)),
            ["HandleSoftDeletes", "AuditLog"]
        );
    }

    #[test]
    fn test_disabled_builtins_are_absent() {
        let registry = ListenerRegistry::resolve(false, false, &[]);
        assert!(registry.bindings().is_empty());
        assert!(registry.by_event().is_empty());
    }

    #[test]
    fn test_unknown_named_listener_is_reported() {
        let declared = [ListenerBinding::new(
            ListenerRef::named("missing"),
            [ModelEvent::Creating],
        )];
        let registry = ListenerRegistry::resolve(false, false, &declared);
        let result = registry.attach(&mut Model::default(), &Registry::default());
        assert!(matches!(result, Err(ResolveError::UnknownListener(name)) if name == "missing"));
    }

    #[test]
    fn test_timestamps_keep_existing_created_at() {
        let mut record = Record::new();
        record.set_attribute(CREATED_AT, "2020-01-01 00:00:00");
        let mut event = Event::with_record(ModelEvent::Creating, record);

        HandleTimestamps.handle(&mut event);

        let record = event.into_record().unwrap();
        assert_eq!(
            record.get(CREATED_AT).and_then(|v| v.as_str()),
            Some("2020-01-01 00:00:00")
        );
        assert!(record.is_set(UPDATED_AT));
    }

    #[test]
    fn test_soft_deletes_skip_relation_fetches() {
        let mut top_level = Event::fetching(Query::new(), false);
        let mut related = Event::fetching(Query::new(), true);

        HandleSoftDeletes.handle(&mut top_level);
        HandleSoftDeletes.handle(&mut related);

        assert_eq!(top_level.into_query().unwrap().conditions().len(), 1);
        assert!(related.into_query().unwrap().conditions().is_empty());
    }

    #[test]
    fn test_soft_delete_prevents_default_and_saves() {
        let mut event = Event::with_record(ModelEvent::Deleting, Record::new());
        HandleSoftDeletes.handle(&mut event);

        assert!(event.is_default_prevented());
        assert!(event.is_save_requested());
        assert!(event.record().is_some_and(|r| r.is_set(DELETED_AT)));
    }
}
