use std::collections::BTreeMap;

use crate::firestore::{Document, StoreError, Value};

/// Remote document store holding one collection.
///
/// Implemented by [`crate::FirestoreClient`]; tests drive the sync layer with
/// in-memory implementations.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Reads every document in the collection, in store order.
    async fn list(&self) -> Result<Vec<Document>, StoreError>;

    /// Creates a document with a store-assigned id and returns it.
    async fn create(&self, fields: &BTreeMap<String, Value>) -> Result<Document, StoreError>;

    /// Overwrites the given fields of document `id`.
    async fn patch(&self, id: &str, fields: &BTreeMap<String, Value>) -> Result<(), StoreError>;

    /// Deletes document `id`.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
