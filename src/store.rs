// The backend seam — generic collection CRUD over JSON records.
//
// The adapter logic talks to this trait only; `PocketBase` implements it
// over the REST API and `MemoryStore` implements it in-process for tests.

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::Filter;

/// Generic record CRUD over named collections.
///
/// Records are plain `serde_json::Value` objects so the seam stays
/// schema-agnostic; the adapter layer converts to and from typed models.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Create a record and return it as stored (with the assigned id and
    /// system fields).
    async fn create(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value>;

    /// Fetch a record by primary key. `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>>;

    /// Fetch the first record matching the filter. `None` if nothing matches.
    async fn first_matching(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<serde_json::Value>>;

    /// Fetch all records matching the filter.
    async fn list(&self, collection: &str, filter: &Filter) -> Result<Vec<serde_json::Value>>;

    /// Partially update a record by primary key and return the updated
    /// record. Fails with `AdapterError::NotFound` if it does not exist.
    async fn patch(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value>;

    /// Delete a record by primary key. Deleting a record that does not
    /// exist is an idempotent no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}
