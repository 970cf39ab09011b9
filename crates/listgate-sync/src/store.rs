//! The store seam the reconciler works against.

use async_trait::async_trait;
use serde_json::{Map, Value};

use listgate_store::{Item, Session, StoreError};

/// Store operations the reconciler needs. Implemented by the real
/// [`Session`]; tests substitute an in-memory recording mock.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Probe for an existing item. A confirmed "does not exist" is
    /// `Ok(None)`; any other failure propagates.
    async fn probe_item(&self, list: &str, id: &str) -> Result<Option<Item>, StoreError>;

    async fn create_item(
        &self,
        list: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), StoreError>;

    async fn update_item(
        &self,
        list: &str,
        id: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), StoreError>;

    async fn delete_item(&self, list: &str, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl ListStore for Session {
    async fn probe_item(&self, list: &str, id: &str) -> Result<Option<Item>, StoreError> {
        let handle = self.list(list);
        match self.fetch_item(&handle, id).await {
            Ok(item) => Ok(Some(item)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_item(
        &self,
        list: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let handle = self.list(list);
        Session::create_item(self, &handle, properties).await
    }

    async fn update_item(
        &self,
        list: &str,
        id: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let handle = self.list(list);
        Session::update_item(self, &handle, id, properties).await
    }

    async fn delete_item(&self, list: &str, id: &str) -> Result<(), StoreError> {
        let handle = self.list(list);
        Session::delete_item(self, &handle, id).await
    }
}
