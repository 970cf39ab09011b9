//! Entity reconciliation against the remote list store.
//!
//! Given a batch of entity records, decide per entity whether it is a
//! create, an update, or a delete, execute the decision through a
//! [`ListStore`], and aggregate the outcomes. Entities are processed
//! strictly in submission order on a single authenticated session.

pub mod batch;
pub mod entity;
pub mod error;
pub mod reconcile;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{process_batch, BatchMode, BatchOptions, BatchReport, EntityResult};
pub use entity::{Entity, FieldKeys};
pub use error::{SyncError, SyncResult};
pub use reconcile::{reconcile, Outcome, ReconcileOptions};
pub use store::ListStore;
