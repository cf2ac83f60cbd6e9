//! Entry — one caller-submitted unit of work.
//!
//! Only `Id` is typed. Everything else (`MessageBody`, `DelaySeconds`,
//! `MessageAttributes`, `MessageGroupId`, ...) rides along in `fields` and
//! is passed to the batch call verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SendError;

/// Name of the identifier field on the wire.
pub const ID_FIELD: &str = "Id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier, unique within one in-flight batch.
    #[serde(rename = "Id")]
    pub id: String,

    /// Opaque payload fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Entry carrying a `MessageBody`.
    pub fn message(id: impl Into<String>, body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::new(id).field("MessageBody", body)
    }

    /// Set an opaque field, replacing any previous value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Build an entry from a dynamic field map.
    ///
    /// `Id` must be present as a non-empty string; it is moved out of the
    /// map into the typed field.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self, SendError> {
        match map.remove(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => Ok(Self { id, fields: map }),
            _ => Err(missing_id()),
        }
    }

    /// Identity comparison. Payload is ignored.
    pub fn same_id(&self, other: &Entry) -> bool {
        self.id == other.id
    }

    pub(crate) fn validate(&self) -> Result<(), SendError> {
        if self.id.is_empty() {
            return Err(missing_id());
        }
        Ok(())
    }
}

fn missing_id() -> SendError {
    SendError::MissingField {
        object: "Message",
        field: ID_FIELD,
    }
}
