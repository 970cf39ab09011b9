//! POST /send-to-list - Reconcile a batch of entities into the store.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{info, instrument};

use listgate_store::Session;
use listgate_sync::{process_batch, BatchMode, BatchOptions, Entity, ReconcileOptions};

use crate::error::ApiListsError;
use crate::models::{BatchDetailResponse, BatchResponse, SendQuery};
use crate::router::ListsState;

/// Reconciles every entity in the posted array against the store, in
/// submission order, over one authenticated session.
///
/// By default the first hard error aborts the batch and the response is
/// the failing entity's problem. With `?detail=entities` each entity is
/// isolated and the response carries one result per entity.
#[instrument(skip_all)]
pub async fn send_to_list(
    State(state): State<ListsState>,
    Query(query): Query<SendQuery>,
    Json(body): Json<Value>,
) -> Result<Response, ApiListsError> {
    let entities =
        Entity::batch_from_value(body).map_err(|e| ApiListsError::InvalidBody(e.to_string()))?;
    info!(entities = entities.len(), "received batch");

    let session = Session::authenticate(&state.store)
        .await
        .map_err(ApiListsError::from_connect)?;

    let opts = BatchOptions {
        reconcile: ReconcileOptions {
            field_keys: state.field_keys.clone(),
            skip_soft_deleted: state.skip_soft_deleted,
        },
        mode: query.batch_mode(),
    };
    let report = process_batch(&session, &entities, &opts).await;

    match opts.mode {
        BatchMode::Isolate => Ok(Json(BatchDetailResponse::from(&report)).into_response()),
        BatchMode::AbortOnError => {
            let response = BatchResponse::from(&report);
            if let Some(err) = report.results.into_iter().find_map(|r| r.outcome.err()) {
                return Err(ApiListsError::Batch(err));
            }
            Ok(Json(response).into_response())
        }
    }
}
