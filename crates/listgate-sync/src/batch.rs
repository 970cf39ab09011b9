//! Batch processing over a single store session.
//!
//! Entities run strictly in submission order. The default mode aborts
//! on the first hard error; callers can opt into isolating failures so
//! the rest of the batch still runs and the per-entity results come
//! back together.

use tracing::{info, instrument, warn};

use crate::entity::Entity;
use crate::error::SyncError;
use crate::reconcile::{reconcile, Outcome, ReconcileOptions};
use crate::store::ListStore;

/// Failure handling for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Stop at the first failing entity; entities after it are never
    /// attempted.
    #[default]
    AbortOnError,
    /// Record the failure and keep going with the next entity.
    Isolate,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub reconcile: ReconcileOptions,
    pub mode: BatchMode,
}

/// Result for one entity, keyed by its position in the batch.
#[derive(Debug)]
pub struct EntityResult {
    pub index: usize,
    pub outcome: Result<Outcome, SyncError>,
}

/// Aggregated result of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<EntityResult>,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// The first failure, for abort-mode callers that surface a single
    /// error for the whole batch.
    pub fn first_failure(&self) -> Option<&SyncError> {
        self.results
            .iter()
            .find_map(|r| r.outcome.as_ref().err())
    }

    fn push(&mut self, index: usize, outcome: Result<Outcome, SyncError>) {
        match &outcome {
            Ok(Outcome::Created) => self.created += 1,
            Ok(Outcome::Updated) => self.updated += 1,
            Ok(Outcome::Deleted) => self.deleted += 1,
            Ok(Outcome::Skipped) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
        self.results.push(EntityResult { index, outcome });
    }
}

/// Reconcile every entity in order against one store session.
#[instrument(skip_all, fields(entities = entities.len()))]
pub async fn process_batch<S: ListStore + ?Sized>(
    store: &S,
    entities: &[Entity],
    opts: &BatchOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    for (index, entity) in entities.iter().enumerate() {
        let outcome = reconcile(store, entity, &opts.reconcile).await;
        if let Err(e) = &outcome {
            warn!(index, error = %e, "entity failed");
            report.push(index, outcome);
            if opts.mode == BatchMode::AbortOnError {
                break;
            }
            continue;
        }
        report.push(index, outcome);
    }
    info!(
        created = report.created,
        updated = report.updated,
        deleted = report.deleted,
        skipped = report.skipped,
        failed = report.failed,
        "batch finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockStore};
    use serde_json::{json, Value};

    fn entities(values: Vec<Value>) -> Vec<Entity> {
        Entity::batch_from_value(Value::Array(values)).unwrap()
    }

    #[tokio::test]
    async fn processes_in_submission_order() {
        let store = MockStore::new();
        let batch = entities(vec![
            json!({ "ListName": "Tasks", "Keys": ["Title"], "Title": "first" }),
            json!({ "ListName": "Tasks", "Keys": ["Title"], "Title": "second" }),
        ]);

        let report = process_batch(&store, &batch, &BatchOptions::default()).await;
        assert!(report.is_success());
        assert_eq!(report.created, 2);

        let calls = store.calls();
        match (&calls[0], &calls[1]) {
            (Call::Create { properties: a, .. }, Call::Create { properties: b, .. }) => {
                assert_eq!(a["Title"], json!("first"));
                assert_eq!(b["Title"], json!("second"));
            }
            other => panic!("expected two creates, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn abort_mode_stops_at_first_failure() {
        let store = MockStore::new().with_create_failure();
        let batch = entities(vec![
            json!({ "ListName": "Tasks", "Keys": ["Title"], "Title": "a" }),
            json!({ "ListName": "Tasks", "Keys": ["Title"], "Title": "b" }),
            json!({ "ListName": "Tasks", "Keys": ["Title"], "Title": "c" }),
        ]);

        let report = process_batch(&store, &batch, &BatchOptions::default()).await;
        assert!(!report.is_success());
        assert_eq!(report.failed, 1);
        assert_eq!(report.results.len(), 1, "later entities never attempted");
        assert_eq!(store.calls().len(), 1);
        assert!(report.first_failure().is_some());
    }

    #[tokio::test]
    async fn isolate_mode_continues_past_failures() {
        let store = MockStore::new()
            .with_existing("Tasks", "9")
            .with_create_failure();
        let batch = entities(vec![
            json!({ "ListName": "Tasks", "Keys": ["Title"], "Title": "a" }),
            json!({ "ListName": "Tasks", "Keys": ["Title"], "Title": "b", "ID": 9 }),
        ]);
        let opts = BatchOptions {
            mode: BatchMode::Isolate,
            ..BatchOptions::default()
        };

        let report = process_batch(&store, &batch, &opts).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].outcome.is_err());
        assert_eq!(report.results[1].index, 1);
    }

    #[tokio::test]
    async fn malformed_entity_fails_without_touching_the_store() {
        let store = MockStore::new();
        let batch = entities(vec![json!({ "Keys": ["Title"], "Title": "a" })]);

        let report = process_batch(&store, &batch, &BatchOptions::default()).await;
        assert_eq!(report.failed, 1);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn skipped_entities_are_counted() {
        let store = MockStore::new();
        let batch = entities(vec![json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "a",
            "_deleted": true
        })]);
        let opts = BatchOptions {
            reconcile: ReconcileOptions {
                skip_soft_deleted: true,
                ..ReconcileOptions::default()
            },
            ..BatchOptions::default()
        };

        let report = process_batch(&store, &batch, &opts).await;
        assert!(report.is_success());
        assert_eq!(report.skipped, 1);
        assert!(store.calls().is_empty());
    }
}
