//! The undecoded result of a completed call.
//!
//! A [`RawResponse`] is what a [`Transport`](crate::Transport) produces: a
//! status code, headers and the complete payload. Decoding only starts once
//! the transport has handed one over.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

use crate::body::Payload;

/// Status, headers and payload of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    status: u16,
    headers: HashMap<String, String>,
    payload: Payload,
}

impl RawResponse {
    /// Creates a response from raw body bytes.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            payload: Payload::Bytes(body),
        }
    }

    /// Creates a response from an already-deserialized document.
    #[must_use]
    pub fn structured(status: u16, headers: HashMap<String, String>, body: Value) -> Self {
        Self {
            status,
            headers,
            payload: Payload::Structured(body),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_ignore_case(&self.headers, name)
    }

    /// Response payload.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Consume into (status, headers, payload).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, Payload) {
        (self.status, self.headers, self.payload)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        is_success(self.status)
    }
}

/// Returns `true` for statuses in the 2xx range.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

pub(crate) fn header_ignore_case<'a>(
    headers: &'a HashMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
