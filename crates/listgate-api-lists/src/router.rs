//! List gateway router configuration.

use axum::{
    routing::{get, post},
    Router,
};

use listgate_store::StoreConfig;
use listgate_sync::FieldKeys;

use crate::handlers::{get_from_list, get_site_users, send_to_list};

/// Shared state for the list gateway routes. Each request opens its
/// own authenticated store session from this configuration.
#[derive(Debug, Clone)]
pub struct ListsState {
    pub store: StoreConfig,
    /// Names of the aliasable control fields on incoming entities.
    pub field_keys: FieldKeys,
    /// When true, entities flagged `_deleted` are skipped.
    pub skip_soft_deleted: bool,
    /// Page cap for the read endpoints.
    pub page_size: u32,
}

impl ListsState {
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store,
            field_keys: FieldKeys::default(),
            skip_soft_deleted: false,
            page_size: 100,
        }
    }

    pub fn with_field_keys(mut self, field_keys: FieldKeys) -> Self {
        self.field_keys = field_keys;
        self
    }

    pub fn with_skip_soft_deleted(mut self, skip: bool) -> Self {
        self.skip_soft_deleted = skip;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Create the list gateway router.
pub fn lists_router(state: ListsState) -> Router {
    Router::new()
        .route("/send-to-list", post(send_to_list))
        .route("/get-from-list/:list_name", get(get_from_list))
        .route("/get-site-users", get(get_site_users))
        .with_state(state)
}
