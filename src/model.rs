//! # Storage Models
//!
//! A [`Model`] couples a [`Table`] with the listeners fired around storage
//! operations. Listeners receive a mutable [`Event`] carrying either the record
//! being written or the query being fetched, and may cancel the default
//! action with [`Event::prevent_default`].

use crate::listener::Listener;
use crate::record::{Query, Record};
use crate::table::Table;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// Lifecycle events fired by the storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelEvent {
    Fetching,
    Creating,
    Updating,
    Deleting,
}

impl ModelEvent {
    pub const ALL: [ModelEvent; 4] = [
        ModelEvent::Fetching,
        ModelEvent::Creating,
        ModelEvent::Updating,
        ModelEvent::Deleting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelEvent::Fetching => "fetching",
            ModelEvent::Creating => "creating",
            ModelEvent::Updating => "updating",
            ModelEvent::Deleting => "deleting",
        }
    }
}

impl Display for ModelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Record(Record),
    Query { query: Query, via_relation: bool },
}

/// An event dispatched to a model's listeners.
#[derive(Debug, Clone)]
pub struct Event {
    kind: ModelEvent,
    payload: Payload,
    default_prevented: bool,
    save_requested: bool,
}

impl Event {
    /// Event carrying a record (`creating`, `updating`, `deleting`).
    pub fn with_record(kind: ModelEvent, record: Record) -> Self {
        Self {
            kind,
            payload: Payload::Record(record),
            default_prevented: false,
            save_requested: false,
        }
    }

    /// `fetching` event; `via_relation` is set when the fetch traverses a relation.
    pub fn fetching(query: Query, via_relation: bool) -> Self {
        Self {
            kind: ModelEvent::Fetching,
            payload: Payload::Query {
                query,
                via_relation,
            },
            default_prevented: false,
            save_requested: false,
        }
    }

    pub fn kind(&self) -> ModelEvent {
        self.kind
    }

    pub fn record(&self) -> Option<&Record> {
        match &self.payload {
            Payload::Record(record) => Some(record),
            Payload::Query { .. } => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match &mut self.payload {
            Payload::Record(record) => Some(record),
            Payload::Query { .. } => None,
        }
    }

    pub fn query_mut(&mut self) -> Option<&mut Query> {
        match &mut self.payload {
            Payload::Query { query, .. } => Some(query),
            Payload::Record(_) => None,
        }
    }

    pub fn is_via_relation(&self) -> bool {
        matches!(self.payload, Payload::Query { via_relation: true, .. })
    }

    /// Cancels the storage engine's default action for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Asks the storage engine to persist the (possibly modified) record.
    pub fn save(&mut self) {
        self.save_requested = true;
    }

    pub fn is_save_requested(&self) -> bool {
        self.save_requested
    }

    pub fn into_record(self) -> Option<Record> {
        match self.payload {
            Payload::Record(record) => Some(record),
            Payload::Query { .. } => None,
        }
    }

    pub fn into_query(self) -> Option<Query> {
        match self.payload {
            Payload::Query { query, .. } => Some(query),
            Payload::Record(_) => None,
        }
    }
}

/// A table plus the listeners attached to it.
#[derive(Clone, Default)]
pub struct Model {
    table: Table,
    listeners: BTreeMap<ModelEvent, Vec<Arc<dyn Listener>>>,
}

impl Model {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            listeners: BTreeMap::new(),
        }
    }

    /// Builds a model from a table-populating callback.
    pub fn make(callback: impl FnOnce(&mut Table)) -> Self {
        let mut table = Table::new();
        callback(&mut table);
        Self::new(table)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Appends `listener` to the listeners of `event`.
    pub fn listen(&mut self, event: ModelEvent, listener: Arc<dyn Listener>) -> &mut Self {
        self.listeners.entry(event).or_default().push(listener);
        self
    }

    pub fn listeners(&self, event: ModelEvent) -> &[Arc<dyn Listener>] {
        self.listeners.get(&event).map(Vec::as_slice).unwrap_or_default()
    }

    /// Runs every listener registered for the event's kind, in registration order.
    pub fn dispatch(&self, event: &mut Event) {
        for listener in self.listeners(event.kind()) {
            listener.handle(event);
        }
    }
}

impl Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: BTreeMap<_, Vec<_>> = self
            .listeners
            .iter()
            .map(|(event, listeners)| (event, listeners.iter().map(|l| l.label()).collect()))
            .collect();
        f.debug_struct("Model")
            .field("table", &self.table)
            .field("listeners", &listeners)
            .finish()
    }
}
