//! Response normalization.
//!
//! The API answers either with an envelope
//! `{success, data | result, message?, insertedId?}` or with the bare
//! payload. [`Envelope`] captures both once, and the `into_*` conversions
//! turn it into the single shape each gateway operation returns.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::{Ack, Created, GatewayError};
use crate::utils::lenient;

/// The two legal response shapes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Wrapped(Wrapped),
    Bare(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Wrapped {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "insertedId")]
    pub inserted_id: Option<Value>,
}

impl Wrapped {
    /// The carried payload; `data` wins when both keys are present
    pub fn payload(self) -> Option<Value> {
        self.data.or(self.result)
    }
}

impl Envelope {
    /// Parse a 2xx response body. An empty body is treated as `null`.
    pub fn parse(body: &str) -> Result<Self, GatewayError> {
        if body.trim().is_empty() {
            return Ok(Envelope::Bare(Value::Null));
        }
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))
    }

    fn rejected(message: Option<String>) -> GatewayError {
        GatewayError::Rejected {
            status: None,
            message: message.unwrap_or_else(|| "The request was not successful".to_string()),
        }
    }

    /// Listing responses; an unrecognized shape yields an empty collection
    pub fn into_collection(self) -> Result<Vec<Value>, GatewayError> {
        match self {
            Envelope::Wrapped(Wrapped { success: false, message, .. }) => Err(Self::rejected(message)),
            Envelope::Wrapped(wrapped) => match wrapped.payload() {
                Some(Value::Array(items)) => Ok(items),
                other => {
                    warn!("⚠️  Envelope payload is not a list, treating as empty: {:?}", other);
                    Ok(Vec::new())
                }
            },
            Envelope::Bare(Value::Array(items)) => Ok(items),
            Envelope::Bare(Value::Object(map)) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                warn!("⚠️  Unrecognized collection shape with keys {:?}, treating as empty", keys);
                Ok(Vec::new())
            }
            other => {
                warn!("⚠️  Unrecognized collection shape, treating as empty: {:?}", other);
                Ok(Vec::new())
            }
        }
    }

    /// Single-entity responses
    pub fn into_entity(self) -> Result<Value, GatewayError> {
        match self {
            Envelope::Wrapped(Wrapped { success: false, message, .. }) => Err(Self::rejected(message)),
            Envelope::Wrapped(wrapped) => match wrapped.payload() {
                Some(entity @ Value::Object(_)) => Ok(entity),
                other => Err(GatewayError::Malformed(format!("expected an entity, got {:?}", other))),
            },
            Envelope::Bare(entity @ Value::Object(_)) => Ok(entity),
            other => Err(GatewayError::Malformed(format!("expected an entity, got {:?}", other))),
        }
    }

    /// Create responses; the new id may sit at the top level, inside
    /// `data`/`result`, or on the returned entity
    pub fn into_created(self) -> Result<Created, GatewayError> {
        let id = match self {
            Envelope::Wrapped(Wrapped { success: false, message, .. }) => return Err(Self::rejected(message)),
            Envelope::Wrapped(wrapped) => {
                let inserted = wrapped.inserted_id.as_ref().and_then(lenient::id_from_value);
                inserted.or_else(|| wrapped.payload().as_ref().and_then(id_from_payload))
            }
            Envelope::Bare(body) => id_from_payload(&body),
        };

        id.map(|id| Created { id })
            .ok_or_else(|| GatewayError::Malformed("create response carried no id".to_string()))
    }

    /// Update and delete responses
    pub fn into_ack(self) -> Result<Ack, GatewayError> {
        match self {
            Envelope::Wrapped(Wrapped { success: false, message, .. }) => Err(Self::rejected(message)),
            Envelope::Wrapped(_) => Ok(Ack),
            Envelope::Bare(Value::Object(map)) => {
                if map.get("acknowledged").and_then(Value::as_bool) == Some(false) {
                    Err(Self::rejected(None))
                } else {
                    Ok(Ack)
                }
            }
            Envelope::Bare(Value::Null) | Envelope::Bare(Value::Bool(true)) => Ok(Ack),
            other => Err(GatewayError::Malformed(format!("expected an acknowledgement, got {:?}", other))),
        }
    }
}

fn id_from_payload(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => ["insertedId", "_id", "id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(lenient::id_from_value)),
        Value::String(_) => lenient::id_from_value(value),
        _ => None,
    }
}

/// Human-readable message out of an error body, if it has one
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
