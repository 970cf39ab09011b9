//! Authenticated store session and item operations.
//!
//! One `Session` is acquired per inbound gateway request and used for
//! every store call that request makes. Lists are addressed by title,
//! items by id within a list. Update and delete ride on POST with a
//! method-override header and an unconditional `IF-MATCH` — that is
//! the store's wire format, not a choice made here.

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

const ACCEPT_ODATA: &str = "application/json; odata=nometadata";

/// Error text the store emits when an item id no longer resolves.
/// Some deployments answer this with a 500 instead of a 404.
const NOT_FOUND_MESSAGE: &str = "Item does not exist. It may have been deleted by another user.";

/// Reference to a named list. Pure URL construction; building a handle
/// performs no I/O and does not validate that the list exists.
#[derive(Debug, Clone)]
pub struct ListHandle {
    title: String,
    url: String,
}

impl ListHandle {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Endpoint of the list's item collection.
    pub fn items_url(&self) -> String {
        format!("{}/items", self.url)
    }

    /// Endpoint of a single item in this list.
    pub fn item_url(&self, id: &str) -> String {
        format!("{}/items({id})", self.url)
    }
}

/// One remote record: an opaque property map. The store assigns and
/// owns the item id; it travels inside the properties (`Id`).
#[derive(Debug, Clone)]
pub struct Item {
    pub properties: Map<String, Value>,
}

impl Item {
    /// The store-assigned id, when the response carried one.
    pub fn id(&self) -> Option<i64> {
        self.properties
            .get("Id")
            .or_else(|| self.properties.get("ID"))
            .and_then(Value::as_i64)
    }
}

/// An authenticated session against the remote store.
pub struct Session {
    base_url: String,
    client: Client,
    token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Session {
    /// Exchange credentials for a bearer token and build the session.
    ///
    /// Fails with [`StoreError::AuthenticationFailed`] whenever the
    /// exchange does not yield a usable token; callers must abort all
    /// dependent store operations in that case.
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub async fn authenticate(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        let params = [
            ("grant_type", "password"),
            ("username", config.username.as_str()),
            ("password", config.password.as_str()),
        ];

        let response = client
            .post(format!("{}/_api/token", config.base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| StoreError::AuthenticationFailed {
                detail: format!("token request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::AuthenticationFailed {
                detail: format!("token endpoint returned {status}: {body}"),
            });
        }

        let body: Value =
            response
                .json()
                .await
                .map_err(|e| StoreError::AuthenticationFailed {
                    detail: format!("unreadable token response: {e}"),
                })?;

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::AuthenticationFailed {
                detail: "token response carried no access_token".to_string(),
            })?
            .to_string();

        debug!("store session established");

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            token,
        })
    }

    /// Build a handle for the list with the given title.
    pub fn list(&self, title: &str) -> ListHandle {
        // Single quotes inside the title are doubled, per the store's
        // OData path escaping.
        let escaped = title.replace('\'', "''");
        ListHandle {
            title: title.to_string(),
            url: format!("{}/_api/web/lists/GetByTitle('{escaped}')", self.base_url),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(header::ACCEPT, ACCEPT_ODATA)
            .bearer_auth(&self.token)
    }

    /// Fetch one item by id, distinguishing a confirmed miss from a
    /// real failure.
    #[instrument(skip(self), fields(list = %list.title()))]
    pub async fn fetch_item(&self, list: &ListHandle, id: &str) -> StoreResult<Item> {
        let response = self
            .request(Method::GET, &list.item_url(id))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let properties: Map<String, Value> = response.json().await.map_err(|e| {
                StoreError::invalid_response(format!("item body was not a JSON object: {e}"))
            })?;
            return Ok(Item { properties });
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND || body.contains(NOT_FOUND_MESSAGE) {
            warn!(id, "item lookup confirmed missing");
            return Err(StoreError::ItemNotFound {
                list: list.title().to_string(),
                id: id.to_string(),
            });
        }

        Err(StoreError::RemoteCall {
            status: status.as_u16(),
            body,
        })
    }

    /// Create a new item with the given properties.
    #[instrument(skip(self, properties), fields(list = %list.title()))]
    pub async fn create_item(
        &self,
        list: &ListHandle,
        properties: &Map<String, Value>,
    ) -> StoreResult<()> {
        let response = self
            .request(Method::POST, &list.items_url())
            .json(properties)
            .send()
            .await?;
        ensure_success(response).await?;
        debug!("item created");
        Ok(())
    }

    /// Overwrite an existing item's properties unconditionally.
    #[instrument(skip(self, properties), fields(list = %list.title()))]
    pub async fn update_item(
        &self,
        list: &ListHandle,
        id: &str,
        properties: &Map<String, Value>,
    ) -> StoreResult<()> {
        let response = self
            .request(Method::POST, &list.item_url(id))
            .header("IF-MATCH", "*")
            .header("X-HTTP-Method", "MERGE")
            .json(properties)
            .send()
            .await?;
        ensure_success(response).await?;
        debug!(id, "item updated");
        Ok(())
    }

    /// Delete an existing item unconditionally.
    #[instrument(skip(self), fields(list = %list.title()))]
    pub async fn delete_item(&self, list: &ListHandle, id: &str) -> StoreResult<()> {
        let response = self
            .request(Method::POST, &list.item_url(id))
            .header("IF-MATCH", "*")
            .header("X-HTTP-Method", "DELETE")
            .send()
            .await?;
        ensure_success(response).await?;
        debug!(id, "item deleted");
        Ok(())
    }

    /// Fetch up to `top` items from a list in one page. Items beyond
    /// the cap are silently omitted; there is no follow-up paging.
    #[instrument(skip(self), fields(list = %list.title()))]
    pub async fn list_items(&self, list: &ListHandle, top: u32) -> StoreResult<Vec<Item>> {
        let response = self
            .request(Method::GET, &list.items_url())
            .query(&[("$top", top.to_string())])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: Value = response.json().await.map_err(|e| {
            StoreError::invalid_response(format!("collection body was not JSON: {e}"))
        })?;
        into_items(body)
    }

    /// Fetch up to `top` entries from the site user directory.
    #[instrument(skip(self))]
    pub async fn site_users(&self, top: u32) -> StoreResult<Vec<Item>> {
        let response = self
            .request(
                Method::GET,
                &format!("{}/_api/web/siteusers", self.base_url),
            )
            .query(&[("$top", top.to_string())])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: Value = response.json().await.map_err(|e| {
            StoreError::invalid_response(format!("user directory body was not JSON: {e}"))
        })?;
        into_items(body)
    }
}

/// Surface a non-success response as a [`StoreError::RemoteCall`]
/// carrying the remote status and body.
async fn ensure_success(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::RemoteCall {
        status: status.as_u16(),
        body,
    })
}

/// Unwrap an OData collection body into items. `odata=nometadata`
/// responses wrap the rows in a `value` array; a bare array is also
/// accepted.
fn into_items(body: Value) -> StoreResult<Vec<Item>> {
    let rows = match body {
        Value::Object(mut obj) => match obj.remove("value") {
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                return Err(StoreError::invalid_response(format!(
                    "'value' member was not an array (got {})",
                    type_name(&other)
                )))
            }
            None => {
                return Err(StoreError::invalid_response(
                    "collection body carried no 'value' member",
                ))
            }
        },
        Value::Array(rows) => rows,
        other => {
            return Err(StoreError::invalid_response(format!(
                "collection body was not an object or array (got {})",
                type_name(&other)
            )))
        }
    };

    rows.into_iter()
        .map(|row| match row {
            Value::Object(properties) => Ok(Item { properties }),
            other => Err(StoreError::invalid_response(format!(
                "collection row was not an object (got {})",
                type_name(&other)
            ))),
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
