//! Entity records and control-field access.
//!
//! An entity is one JSON object from the submitted batch. Besides its
//! payload fields it carries control fields: the target list, the
//! projection whitelist (`Keys`), an optional remote id, the soft-delete
//! marker set by the source system, and an explicit delete instruction.
//! The names of the list and item-type fields are deployment-configurable.

use serde_json::{Map, Value};

use listgate_store::coerce_to_string;

use crate::error::SyncError;

/// Configurable names for the two aliasable control fields.
#[derive(Debug, Clone)]
pub struct FieldKeys {
    /// Field holding the target list title.
    pub list_name: String,
    /// Field holding the remote item type discriminator.
    pub item_type: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self {
            list_name: "ListName".to_string(),
            item_type: "ListItemEntityTypeFullName".to_string(),
        }
    }
}

/// One entity record from a submitted batch.
#[derive(Debug, Clone)]
pub struct Entity {
    record: Map<String, Value>,
}

impl Entity {
    pub fn new(record: Map<String, Value>) -> Self {
        Self { record }
    }

    /// Parse a whole batch: a JSON array of objects.
    pub fn batch_from_value(body: Value) -> Result<Vec<Entity>, SyncError> {
        let rows = match body {
            Value::Array(rows) => rows,
            _ => return Err(SyncError::invalid_batch("body must be a JSON array")),
        };
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| match row {
                Value::Object(record) => Ok(Entity::new(record)),
                _ => Err(SyncError::invalid_batch(format!(
                    "element {index} is not a JSON object"
                ))),
            })
            .collect()
    }

    /// The target list title. Required.
    pub fn list_name(&self, keys: &FieldKeys) -> Result<&str, SyncError> {
        match self.record.get(&keys.list_name) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s),
            Some(_) => Err(SyncError::InvalidField {
                field: keys.list_name.clone(),
                expected: "a non-empty string",
            }),
            None => Err(SyncError::MissingRequired {
                field: keys.list_name.clone(),
            }),
        }
    }

    /// The remote item type discriminator, used only on creation.
    pub fn item_type(&self, keys: &FieldKeys) -> Option<&str> {
        self.record.get(&keys.item_type).and_then(Value::as_str)
    }

    /// The projection whitelist. Required.
    pub fn keys(&self) -> Result<Vec<&str>, SyncError> {
        let raw = self
            .record
            .get("Keys")
            .ok_or_else(|| SyncError::MissingRequired {
                field: "Keys".to_string(),
            })?;
        let rows = raw.as_array().ok_or(SyncError::InvalidField {
            field: "Keys".to_string(),
            expected: "an array of strings",
        })?;
        rows.iter()
            .map(|v| {
                v.as_str().ok_or(SyncError::InvalidField {
                    field: "Keys".to_string(),
                    expected: "an array of strings",
                })
            })
            .collect()
    }

    /// The remote item id, when present. Any non-null value counts and
    /// is rendered as text for the wire.
    pub fn id(&self) -> Option<String> {
        match self.record.get("ID") {
            None | Some(Value::Null) => None,
            Some(value) => Some(coerce_to_string(value)),
        }
    }

    /// Whether the source system flagged this entity as deleted.
    /// Distinct from [`should_delete`](Self::should_delete).
    pub fn is_soft_deleted(&self) -> bool {
        matches!(self.record.get("_deleted"), Some(Value::Bool(true)))
    }

    /// Whether the caller explicitly asked for the remote item to be
    /// deleted. `true`, `"true"` and `"True"` all count.
    pub fn should_delete(&self) -> bool {
        match self.record.get("SHOULD_DELETE") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true" || s == "True",
            _ => false,
        }
    }

    /// Project the record over `Keys`, coercing every value to text.
    /// Only projected fields ever reach the store.
    pub fn projected(&self) -> Result<Map<String, Value>, SyncError> {
        let mut values = Map::new();
        for key in self.keys()? {
            let value = self
                .record
                .get(key)
                .ok_or_else(|| SyncError::MissingProjected {
                    field: key.to_string(),
                })?;
            values.insert(key.to_string(), Value::String(coerce_to_string(value)));
        }
        Ok(values)
    }

    /// Serialized form of the record, for error context.
    pub fn to_json(&self) -> String {
        Value::Object(self.record.clone()).to_string()
    }
}
