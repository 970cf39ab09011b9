//! List gateway API.
//!
//! Routes:
//! - POST /send-to-list - Reconcile a batch of entities into the store
//! - GET /get-from-list/:list_name - Read a page of items from a list
//! - GET /get-site-users - Read the site user directory

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use error::ApiListsError;
pub use router::{lists_router, ListsState};
