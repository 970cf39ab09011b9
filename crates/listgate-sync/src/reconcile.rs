//! Per-entity reconciliation.
//!
//! Decides create vs. update vs. delete for one entity and executes the
//! decision. The existence probe runs only when the entity carries an
//! `ID`; a confirmed miss falls through to the create path, so stale
//! ids degrade to creates instead of failing the entity.

use serde_json::{json, Map};
use tracing::{debug, info};

use crate::entity::{Entity, FieldKeys};
use crate::error::SyncError;
use crate::store::ListStore;

/// How reconciliation treats the aliasable fields and soft-deleted
/// entities for this deployment.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub field_keys: FieldKeys,
    /// When false, entities flagged `_deleted` are skipped without any
    /// store call.
    pub skip_soft_deleted: bool,
}

/// What reconciliation did for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Deleted => "deleted",
            Outcome::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconcile one entity against the store.
///
/// Any hard error is wrapped with the serialized entity so batch
/// callers can report which record failed.
pub async fn reconcile<S: ListStore + ?Sized>(
    store: &S,
    entity: &Entity,
    opts: &ReconcileOptions,
) -> Result<Outcome, SyncError> {
    run(store, entity, opts)
        .await
        .map_err(|source| SyncError::Entity {
            entity: entity.to_json(),
            source: Box::new(source),
        })
}

async fn run<S: ListStore + ?Sized>(
    store: &S,
    entity: &Entity,
    opts: &ReconcileOptions,
) -> Result<Outcome, SyncError> {
    if entity.is_soft_deleted() && opts.skip_soft_deleted {
        debug!("entity marked deleted, skipping");
        return Ok(Outcome::Skipped);
    }

    let list = entity.list_name(&opts.field_keys)?;
    let values = entity.projected()?;

    // Existence probe. A confirmed miss means "no existing item" and we
    // proceed as a create; anything else is terminal for this entity.
    let existing_id = match entity.id() {
        Some(id) => store.probe_item(list, &id).await?.map(|_| id),
        None => None,
    };

    match existing_id {
        None => {
            let mut properties = Map::new();
            if let Some(item_type) = entity.item_type(&opts.field_keys) {
                properties.insert("__metadata".to_string(), json!({ "type": item_type }));
            }
            properties.extend(values);
            info!(list, "creating new item");
            store.create_item(list, &properties).await?;
            Ok(Outcome::Created)
        }
        Some(id) if entity.should_delete() => {
            info!(list, id, "existing item found, deleting");
            store.delete_item(list, &id).await?;
            Ok(Outcome::Deleted)
        }
        Some(id) => {
            // The type discriminator is a creation-only concern; updates
            // send just the projected values.
            info!(list, id, "existing item found, updating");
            store.update_item(list, &id, &values).await?;
            Ok(Outcome::Updated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockStore};
    use serde_json::{json, Value};

    fn entity(value: Value) -> Entity {
        match value {
            Value::Object(record) => Entity::new(record),
            _ => panic!("test entity must be an object"),
        }
    }

    fn opts() -> ReconcileOptions {
        ReconcileOptions::default()
    }

    #[tokio::test]
    async fn no_id_always_creates_even_with_should_delete() {
        let store = MockStore::new();
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "A",
            "SHOULD_DELETE": true
        }));

        let outcome = reconcile(&store, &e, &opts()).await.unwrap();
        assert_eq!(outcome, Outcome::Created);

        let calls = store.calls();
        assert_eq!(calls.len(), 1, "no probe, no update, no delete");
        match &calls[0] {
            Call::Create { list, properties } => {
                assert_eq!(list, "Tasks");
                assert_eq!(properties["Title"], json!("A"));
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn probe_miss_falls_through_to_create() {
        let store = MockStore::new();
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "A",
            "ID": 42
        }));

        let outcome = reconcile(&store, &e, &opts()).await.unwrap();
        assert_eq!(outcome, Outcome::Created);

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Probe { id, .. } if id == "42"));
        assert!(matches!(&calls[1], Call::Create { .. }));
    }

    #[tokio::test]
    async fn existing_item_with_should_delete_issues_delete_only() {
        let store = MockStore::new().with_existing("Tasks", "7");
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "B",
            "ID": 7,
            "SHOULD_DELETE": "true"
        }));

        let outcome = reconcile(&store, &e, &opts()).await.unwrap();
        assert_eq!(outcome, Outcome::Deleted);

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[1], Call::Delete { list, id } if list == "Tasks" && id == "7"));
    }

    #[tokio::test]
    async fn existing_item_without_should_delete_updates_projected_fields() {
        let store = MockStore::new().with_existing("Tasks", "7");
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title", "Estimate"],
            "Title": "B",
            "Estimate": 3,
            "Ignored": "never sent",
            "ID": 7
        }));

        let outcome = reconcile(&store, &e, &opts()).await.unwrap();
        assert_eq!(outcome, Outcome::Updated);

        let calls = store.calls();
        match &calls[1] {
            Call::Update {
                list,
                id,
                properties,
            } => {
                assert_eq!(list, "Tasks");
                assert_eq!(id, "7");
                assert_eq!(properties.len(), 2);
                assert_eq!(properties["Title"], json!("B"));
                assert_eq!(properties["Estimate"], json!("3"));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn type_discriminator_is_attached_only_on_create() {
        let store = MockStore::new();
        let e = entity(json!({
            "ListName": "Tasks",
            "ListItemEntityTypeFullName": "SP.Data.TasksListItem",
            "Keys": ["Title"],
            "Title": "A"
        }));
        reconcile(&store, &e, &opts()).await.unwrap();
        match &store.calls()[0] {
            Call::Create { properties, .. } => {
                assert_eq!(
                    properties["__metadata"],
                    json!({ "type": "SP.Data.TasksListItem" })
                );
            }
            other => panic!("expected create, got {other:?}"),
        }

        let store = MockStore::new().with_existing("Tasks", "7");
        let e = entity(json!({
            "ListName": "Tasks",
            "ListItemEntityTypeFullName": "SP.Data.TasksListItem",
            "Keys": ["Title"],
            "Title": "A",
            "ID": 7
        }));
        reconcile(&store, &e, &opts()).await.unwrap();
        match &store.calls()[1] {
            Call::Update { properties, .. } => {
                assert!(!properties.contains_key("__metadata"));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn soft_deleted_entity_is_skipped_without_store_calls() {
        let store = MockStore::new();
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "A",
            "_deleted": true
        }));
        let skip_opts = ReconcileOptions {
            skip_soft_deleted: true,
            ..ReconcileOptions::default()
        };

        let outcome = reconcile(&store, &e, &skip_opts).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn soft_deleted_entity_is_processed_when_flag_allows() {
        let store = MockStore::new();
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "A",
            "_deleted": true
        }));
        let outcome = reconcile(&store, &e, &opts()).await.unwrap();
        assert_eq!(outcome, Outcome::Created);
    }

    #[tokio::test]
    async fn repeated_create_is_not_deduplicated() {
        let store = MockStore::new();
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "A"
        }));
        reconcile(&store, &e, &opts()).await.unwrap();
        reconcile(&store, &e, &opts()).await.unwrap();
        assert_eq!(
            store
                .calls()
                .iter()
                .filter(|c| matches!(c, Call::Create { .. }))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn probe_hard_failure_aborts_the_entity_with_context() {
        let store = MockStore::new().with_probe_failure();
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "A",
            "ID": 7
        }));

        let err = reconcile(&store, &e, &opts()).await.unwrap_err();
        match err {
            SyncError::Entity { entity, source } => {
                assert!(entity.contains(r#""ListName":"Tasks""#));
                assert!(matches!(*source, SyncError::Store(_)));
            }
            other => panic!("expected Entity wrapper, got {other:?}"),
        }
        // The probe failed hard, so no mutation was attempted.
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn create_failure_embeds_the_serialized_entity() {
        let store = MockStore::new().with_create_failure();
        let e = entity(json!({
            "ListName": "Tasks",
            "Keys": ["Title"],
            "Title": "A"
        }));

        let err = reconcile(&store, &e, &opts()).await.unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains(r#""Title":"A""#), "got: {rendered}");
    }
}
