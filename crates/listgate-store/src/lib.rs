//! Remote list store client.
//!
//! Speaks the store's REST dialect: lists addressed by title, items
//! addressed by numeric id inside a list, and a site-wide user
//! directory. A [`Session`] is acquired once per incoming gateway
//! request and dropped at the end of it; there is no pooling or reuse
//! across requests.

pub mod config;
pub mod error;
pub mod session;
pub mod value;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use session::{Item, ListHandle, Session};
pub use value::coerce_to_string;
