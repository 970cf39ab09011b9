//! Read endpoints: list items and the site user directory.
//!
//! Responses are streamed as a JSON array, one element serialized at a
//! time, so a large page never has to be buffered as one string.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::instrument;

use listgate_store::{Item, Session};

use crate::error::ApiListsError;
use crate::router::ListsState;

/// GET /get-from-list/:list_name - One page of items from a list.
#[instrument(skip(state))]
pub async fn get_from_list(
    State(state): State<ListsState>,
    Path(list_name): Path<String>,
) -> Result<Response, ApiListsError> {
    let session = Session::authenticate(&state.store)
        .await
        .map_err(ApiListsError::from_connect)?;
    let handle = session.list(&list_name);
    let items = session.list_items(&handle, state.page_size).await?;
    Ok(json_array_response(items))
}

/// GET /get-site-users - The site user directory.
#[instrument(skip(state))]
pub async fn get_site_users(State(state): State<ListsState>) -> Result<Response, ApiListsError> {
    let session = Session::authenticate(&state.store)
        .await
        .map_err(ApiListsError::from_connect)?;
    let users = session.site_users(state.page_size).await?;
    Ok(json_array_response(users))
}

fn json_array_response(items: Vec<Item>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        json_array_body(items),
    )
        .into_response()
}

/// Serialize the items as a JSON array incrementally.
fn json_array_body(items: Vec<Item>) -> Body {
    if items.is_empty() {
        return Body::from("[]");
    }
    let elements = stream::iter(items.into_iter().enumerate()).map(|(i, item)| {
        let mut buf = if i == 0 { vec![b'['] } else { vec![b','] };
        serde_json::to_writer(&mut buf, &Value::Object(item.properties))?;
        Ok::<_, serde_json::Error>(Bytes::from(buf))
    });
    let closing = stream::once(async { Ok(Bytes::from_static(b"]")) });
    Body::from_stream(elements.chain(closing))
}
