//! In-memory recording store for reconciler and batch tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use listgate_store::{Item, StoreError};

use crate::store::ListStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Probe {
        list: String,
        id: String,
    },
    Create {
        list: String,
        properties: Map<String, Value>,
    },
    Update {
        list: String,
        id: String,
        properties: Map<String, Value>,
    },
    Delete {
        list: String,
        id: String,
    },
}

/// Records every call and answers probes from a fixed set of existing
/// (list, id) pairs. Failure flags make the corresponding operation
/// return a remote error.
#[derive(Debug, Default)]
pub struct MockStore {
    existing: Vec<(String, String)>,
    probe_fails: bool,
    create_fails: bool,
    update_fails: bool,
    delete_fails: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(mut self, list: &str, id: &str) -> Self {
        self.existing.push((list.to_string(), id.to_string()));
        self
    }

    pub fn with_probe_failure(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    pub fn with_create_failure(mut self) -> Self {
        self.create_fails = true;
        self
    }

    pub fn with_update_failure(mut self) -> Self {
        self.update_fails = true;
        self
    }

    pub fn with_delete_failure(mut self) -> Self {
        self.delete_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn remote_error() -> StoreError {
        StoreError::RemoteCall {
            status: 503,
            body: "remote unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ListStore for MockStore {
    async fn probe_item(&self, list: &str, id: &str) -> Result<Option<Item>, StoreError> {
        self.record(Call::Probe {
            list: list.to_string(),
            id: id.to_string(),
        });
        if self.probe_fails {
            return Err(Self::remote_error());
        }
        let found = self
            .existing
            .iter()
            .any(|(l, i)| l == list && i == id);
        if found {
            let mut properties = Map::new();
            properties.insert("Id".to_string(), json!(id));
            Ok(Some(Item { properties }))
        } else {
            Ok(None)
        }
    }

    async fn create_item(
        &self,
        list: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.record(Call::Create {
            list: list.to_string(),
            properties: properties.clone(),
        });
        if self.create_fails {
            return Err(Self::remote_error());
        }
        Ok(())
    }

    async fn update_item(
        &self,
        list: &str,
        id: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.record(Call::Update {
            list: list.to_string(),
            id: id.to_string(),
            properties: properties.clone(),
        });
        if self.update_fails {
            return Err(Self::remote_error());
        }
        Ok(())
    }

    async fn delete_item(&self, list: &str, id: &str) -> Result<(), StoreError> {
        self.record(Call::Delete {
            list: list.to_string(),
            id: id.to_string(),
        });
        if self.delete_fails {
            return Err(Self::remote_error());
        }
        Ok(())
    }
}
