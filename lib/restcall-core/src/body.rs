//! Payload representation and JSON codec helpers.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;

/// The payload of a completed call.
///
/// Transports usually hand over raw bytes. Callers that already hold a
/// deserialized document (a cached reply, an in-process transport) can
/// pass it as [`Payload::Structured`] and skip re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw body bytes, expected to hold JSON.
    Bytes(Bytes),
    /// An already-deserialized JSON document.
    Structured(Value),
}

impl Payload {
    /// Returns `true` if there is nothing to decode.
    ///
    /// Whitespace-only bodies and a structured `null` count as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes(bytes) => bytes.iter().all(u8::is_ascii_whitespace),
            Self::Structured(value) => value.is_null(),
        }
    }

    /// Raw bytes, if this payload was not pre-parsed.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Structured(_) => None,
        }
    }

    /// Deserialize the payload with path-aware error messages.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the payload is not valid JSON or
    /// does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Bytes(bytes) => from_json(bytes),
            Self::Structured(value) => from_value(value),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&'static str> for Payload {
    fn from(text: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use restcall_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Greeting { message: String }
///
/// let greeting = Greeting { message: "Hello".to_string() };
/// let bytes = to_json(&greeting).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"message":"Hello"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the exact field that
/// failed to deserialize.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] with the path to the problematic
/// field (e.g., `elements[1].status`).
///
/// # Example
///
/// ```
/// use restcall_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Greeting { message: String }
///
/// let bytes = br#"{"message":"Hello"}"#;
/// let greeting: Greeting = from_json(bytes).expect("deserialize");
/// assert_eq!(greeting, Greeting { message: "Hello".to_string() });
/// ```
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| crate::Error::decode(e.path().to_string(), e.inner().to_string()))
}

/// Deserialize an already-parsed JSON tree with path-aware error messages.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] if the tree does not match `T`.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    serde_path_to_error::deserialize(value)
        .map_err(|e| crate::Error::decode(e.path().to_string(), e.inner().to_string()))
}
