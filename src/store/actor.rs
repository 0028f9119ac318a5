//! # Store Actor
//!
//! The reference storage engine. A single [`StoreActor`] owns the rows of
//! every table and processes [`StoreRequest`]s sequentially in its own Tokio
//! task, so the row maps need no locking.

use super::client::StoreClient;
use super::message::StoreRequest;
use crate::error::StoreError;
use crate::model::{Event, Model, ModelEvent};
use crate::record::{Attributes, Query, Record};
use crate::table::ColumnType;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Rows of one table, kept in insertion order.
struct TableRows {
    rows: HashMap<String, Record>,
    order: Vec<String>,
    next_id: u64,
}

impl Default for TableRows {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }
}

impl TableRows {
    fn put(&mut self, key: String, record: Record) {
        if self.rows.insert(key.clone(), record).is_none() {
            self.order.push(key);
        }
    }

    fn remove(&mut self, key: &str) {
        if self.rows.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }
}

/// Server half of the reference store.
///
/// * **Insert**: assigns the next id to an `increments` primary key when the
///   record has none, fires `creating`, then stores the record. A key that is
///   already stored is rejected.
/// * **Find**: direct key lookup; no listeners run, so soft-deleted records
///   stay reachable.
/// * **Fetch**: fires `fetching` (listeners may narrow the query), then
///   returns matching rows in insertion order.
/// * **Update**: merges attributes into the stored record, fires `updating`,
///   stores the result.
/// * **Delete**: fires `deleting`; removes the row unless a listener prevented
///   it, in which case a requested save writes the listener's record back.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    tables: HashMap<String, TableRows>,
}

impl StoreActor {
    /// Creates a store actor and the client used to reach it.
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            tables: HashMap::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        info!("Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert {
                    model,
                    record,
                    respond_to,
                } => {
                    let table = model.table().table_name().to_string();
                    debug!(%table, ?record, "Insert");
                    let result = self.insert(&model, record);
                    if let Err(e) = &result {
                        warn!(%table, error = %e, "Insert failed");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Find {
                    model,
                    key,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.find(&model, &key));
                }
                StoreRequest::Fetch {
                    model,
                    query,
                    via_relation,
                    respond_to,
                } => {
                    let _ = respond_to.send(Ok(self.fetch(&model, query, via_relation)));
                }
                StoreRequest::Update {
                    model,
                    key,
                    attributes,
                    respond_to,
                } => {
                    let table = model.table().table_name().to_string();
                    debug!(%table, %key, ?attributes, "Update");
                    let result = self.update(&model, &key, attributes);
                    if let Err(e) = &result {
                        warn!(%table, %key, error = %e, "Update failed");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Delete {
                    model,
                    key,
                    respond_to,
                } => {
                    let table = model.table().table_name().to_string();
                    debug!(%table, %key, "Delete");
                    let result = self.delete(&model, &key);
                    if let Err(e) = &result {
                        warn!(%table, %key, error = %e, "Delete failed");
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(tables = self.tables.len(), "Shutdown");
    }

    fn insert(&mut self, model: &Model, mut record: Record) -> Result<Record, StoreError> {
        let table = model.table();
        let primary = table
            .primary_key()
            .ok_or_else(|| StoreError::MissingPrimaryKey(table.table_name().to_string()))?;
        let rows = self.tables.entry(table.table_name().to_string()).or_default();

        if !record.is_set(primary.name()) && primary.column_type() == ColumnType::Increments {
            record.set_attribute(primary.name(), rows.next_id);
        }

        let mut event = Event::with_record(ModelEvent::Creating, record);
        model.dispatch(&mut event);
        let prevented = event.is_default_prevented();
        let record = take_record(event);
        if prevented {
            debug!(table = table.table_name(), "Insert prevented by listener");
            return Ok(record);
        }

        let key = key_string(
            table.table_name(),
            record.get(primary.name()).unwrap_or(&Value::Null),
        )?;
        if rows.rows.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                table: table.table_name().to_string(),
                key,
            });
        }
        if let Some(id) = record.get(primary.name()).and_then(Value::as_u64) {
            rows.next_id = rows.next_id.max(id.saturating_add(1));
        }
        rows.put(key.clone(), record.clone());
        info!(table = table.table_name(), %key, size = rows.rows.len(), "Created");
        Ok(record)
    }

    fn find(&self, model: &Model, key: &Value) -> Result<Option<Record>, StoreError> {
        let table = model.table().table_name();
        let key = key_string(table, key)?;
        let record = self
            .tables
            .get(table)
            .and_then(|rows| rows.rows.get(&key))
            .cloned();
        debug!(table, %key, found = record.is_some(), "Find");
        Ok(record)
    }

    fn fetch(&self, model: &Model, query: Query, via_relation: bool) -> Vec<Record> {
        let table = model.table().table_name();
        let mut event = Event::fetching(query, via_relation);
        model.dispatch(&mut event);
        if event.is_default_prevented() {
            debug!(table, "Fetch prevented by listener");
            return Vec::new();
        }
        let query = event.into_query().unwrap_or_default();

        let records: Vec<Record> = self
            .tables
            .get(table)
            .map(|rows| {
                rows.order
                    .iter()
                    .filter_map(|key| rows.rows.get(key))
                    .filter(|record| query.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!(table, count = records.len(), via_relation, "Fetch");
        records
    }

    fn update(
        &mut self,
        model: &Model,
        key: &Value,
        attributes: Attributes,
    ) -> Result<Record, StoreError> {
        let table = model.table().table_name();
        let key = key_string(table, key)?;
        let rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let mut record = rows
            .rows
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let original = record.clone();
        record.merge(attributes);

        let mut event = Event::with_record(ModelEvent::Updating, record);
        model.dispatch(&mut event);
        if event.is_default_prevented() {
            debug!(table, %key, "Update prevented by listener");
            return Ok(original);
        }

        let record = take_record(event);
        rows.put(key.clone(), record.clone());
        info!(table, %key, "Updated");
        Ok(record)
    }

    fn delete(&mut self, model: &Model, key: &Value) -> Result<(), StoreError> {
        let table = model.table().table_name();
        let key = key_string(table, key)?;
        let rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let record = rows
            .rows
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        let mut event = Event::with_record(ModelEvent::Deleting, record);
        model.dispatch(&mut event);

        if !event.is_default_prevented() {
            rows.remove(&key);
            info!(table, %key, size = rows.rows.len(), "Deleted");
        } else if event.is_save_requested() {
            rows.put(key.clone(), take_record(event));
            info!(table, %key, "Delete intercepted, record saved");
        } else {
            debug!(table, %key, "Delete prevented by listener");
        }
        Ok(())
    }
}

/// Record events are built with a record payload, so this never falls back.
fn take_record(event: Event) -> Record {
    event.into_record().unwrap_or_default()
}

fn key_string(table: &str, key: &Value) -> Result<String, StoreError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(StoreError::InvalidKey {
            table: table.to_string(),
            key: other.to_string(),
        }),
    }
}
