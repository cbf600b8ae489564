//! Response envelope — the `{header: {code, msg}, payload}` wrapper the
//! backend uses on every response.
//!
//! DESIGN
//! ======
//! The `code` field is an application-level status carried inside a 200 HTTP
//! response, not the transport status. Handlers branch on it; anything the
//! backend omits deserializes to the zero value so a malformed envelope never
//! aborts a handler before its own branching does.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Envelope code for success.
pub const CODE_OK: u16 = 200;

/// Envelope code for validation failure.
pub const CODE_BAD_REQUEST: u16 = 400;

/// Envelope code for a missing entity.
pub const CODE_NOT_FOUND: u16 = 404;

// =============================================================================
// TYPES
// =============================================================================

/// Status header present on every backend response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub msg: String,
}

/// The backend response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub header: Header,
    /// Operation result, shape varies per endpoint. `Null` when absent.
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    /// Build an envelope with an explicit code and message.
    #[must_use]
    pub fn new(code: u16, msg: impl Into<String>, payload: Value) -> Self {
        Self { header: Header { code, msg: msg.into() }, payload }
    }

    /// Build a success envelope around a payload.
    #[must_use]
    pub fn ok(payload: Value) -> Self {
        Self::new(CODE_OK, "", payload)
    }
}

// =============================================================================
// PAYLOAD ADAPTERS
// =============================================================================

/// Errors adapting an envelope payload into a typed record.
#[derive(Debug, thiserror::Error)]
pub enum AdaptError {
    /// The payload was `Null` or an empty list.
    #[error("empty payload")]
    EmptyPayload,

    /// The payload did not match the expected record shape.
    #[error("payload shape mismatch: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Adapt a list-shaped payload: the first element of a list, or the payload
/// itself when the backend answers with a bare object.
pub fn read_list<T: DeserializeOwned>(envelope: &Envelope) -> Result<T, AdaptError> {
    match &envelope.payload {
        Value::Array(items) => {
            let first = items.first().ok_or(AdaptError::EmptyPayload)?;
            Ok(serde_json::from_value(first.clone())?)
        }
        Value::Null => Err(AdaptError::EmptyPayload),
        other => Ok(serde_json::from_value(other.clone())?),
    }
}

/// Adapt an object-shaped payload directly.
pub fn read_object<T: DeserializeOwned>(envelope: &Envelope) -> Result<T, AdaptError> {
    match &envelope.payload {
        Value::Null => Err(AdaptError::EmptyPayload),
        other => Ok(serde_json::from_value(other.clone())?),
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
