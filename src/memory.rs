// In-memory record store — HashMap-based `RecordStore` for tests and
// prototyping.
//
// Assigns PocketBase-style 15-character record ids and maintains the
// `created`/`updated` system fields. Thread-safe via `tokio::sync::RwLock`;
// data is lost when the store is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::datetime::format_timestamp;
use crate::error::{AdapterError, Result};
use crate::filter::Filter;
use crate::store::RecordStore;

/// PocketBase record ids are 15 lowercase alphanumeric characters.
const ID_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
const ID_LENGTH: usize = 15;

type Collections = HashMap<String, Vec<serde_json::Value>>;

/// In-memory implementation of [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all collections (for debugging/assertions).
    pub async fn snapshot(&self) -> Collections {
        self.collections.read().await.clone()
    }

    /// Drop all records.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }

    /// Number of records in a collection.
    pub async fn collection_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|records| records.len())
            .unwrap_or(0)
    }
}

/// A record matches when every clause's field equals its string value.
fn matches(record: &serde_json::Value, filter: &Filter) -> bool {
    filter.clauses().all(|(field, value)| {
        record
            .get(field)
            .and_then(serde_json::Value::as_str)
            .map(|v| v == value)
            .unwrap_or(false)
    })
}

fn record_id(record: &serde_json::Value) -> Option<&str> {
    record.get("id").and_then(serde_json::Value::as_str)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let mut record = match data {
            serde_json::Value::Object(map) => serde_json::Value::Object(map),
            other => {
                return Err(AdapterError::Mapping(format!(
                    "record body must be a JSON object, got {other}"
                )))
            }
        };

        let now = format_timestamp(&Utc::now());
        record["id"] = nanoid::nanoid!(ID_LENGTH, &ID_ALPHABET).into();
        record["created"] = now.clone().into();
        record["updated"] = now.into();

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| record_id(r) == Some(id)))
            .cloned())
    }

    async fn first_matching(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<serde_json::Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| matches(r, filter)))
            .cloned())
    }

    async fn list(&self, collection: &str, filter: &Filter) -> Result<Vec<serde_json::Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches(r, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let changes = match data {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(AdapterError::Mapping(format!(
                    "patch body must be a JSON object, got {other}"
                )))
            }
        };

        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| record_id(r) == Some(id)))
            .ok_or(AdapterError::NotFound)?;

        for (field, value) in changes {
            record[field.as_str()] = value;
        }
        record["updated"] = format_timestamp(&Utc::now()).into();
        Ok(record.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(records) = collections.get_mut(collection) {
            records.retain(|r| record_id(r) != Some(id));
        }
        Ok(())
    }
}
