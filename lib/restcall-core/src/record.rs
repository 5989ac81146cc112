//! Decoded error information.
//!
//! An [`ErrorRecord`] holds everything a server reported about a failed call.
//! It reaches the caller in one of two wrappers:
//!
//! - embedded in a [`Response`](crate::Response) when the call ran with
//!   [`ErrorHandlingBehavior::TreatServerErrorAsSuccess`](crate::ErrorHandlingBehavior),
//! - inside a raised [`ResponseError`] otherwise.
//!
//! Both implement [`ServiceError`], so inspection code does not care which
//! path produced the error.

use std::collections::HashMap;
use std::fmt;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error source reported when the payload does not name one.
pub const DEFAULT_ERROR_SOURCE: &str = "UNKNOWN";

/// Error source used by application code on the server.
pub const APP_ERROR_SOURCE: &str = "APP";

// ============================================================================
// Error Details
// ============================================================================

/// Open-ended, string-keyed tree of additional error details.
///
/// The set of keys is defined by the server, so values are kept as generic
/// JSON trees rather than a fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorDetails(Map<String, Value>);

impl ErrorDetails {
    /// Creates an empty details map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value stored under `key`.
    ///
    /// Returns `None` if the key is absent or holds a non-string value.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Nested map stored under `key`.
    #[must_use]
    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Returns `true` if no detail was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over top-level entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ErrorDetails {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ErrorDetails {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ============================================================================
// Error Record
// ============================================================================

/// Structured error reported by the server for a failed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_error_code: Option<i32>,
    message: String,
    error_source: String,
    exception_class: String,
    stack_trace: String,
    error_details: ErrorDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl ErrorRecord {
    /// Creates a record holding only a status; every other field takes its default.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            service_error_code: None,
            message: String::new(),
            error_source: DEFAULT_ERROR_SOURCE.to_string(),
            exception_class: String::new(),
            stack_trace: String::new(),
            error_details: ErrorDetails::default(),
            code: None,
            doc_url: None,
            request_id: None,
        }
    }

    /// Set the application-level error code.
    #[must_use]
    pub const fn with_service_error_code(mut self, code: i32) -> Self {
        self.service_error_code = Some(code);
        self
    }

    /// Set the error message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the error source tag.
    #[must_use]
    pub fn with_error_source(mut self, source: impl Into<String>) -> Self {
        self.error_source = source.into();
        self
    }

    /// Set the exception class identifier.
    #[must_use]
    pub fn with_exception_class(mut self, class: impl Into<String>) -> Self {
        self.exception_class = class.into();
        self
    }

    /// Set the stack trace text.
    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = stack_trace.into();
        self
    }

    /// Set the error details tree.
    #[must_use]
    pub fn with_error_details(mut self, details: ErrorDetails) -> Self {
        self.error_details = details;
        self
    }

    /// Set the symbolic error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the documentation URL.
    #[must_use]
    pub fn with_doc_url(mut self, doc_url: impl Into<String>) -> Self {
        self.doc_url = Some(doc_url.into());
        self
    }

    /// Set the server-side request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Replace the status with the one the record was delivered under.
    pub(crate) const fn at_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Application-level error code, distinct from the HTTP status.
    #[must_use]
    pub const fn service_error_code(&self) -> Option<i32> {
        self.service_error_code
    }

    /// Error message (empty if none was reported).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error source tag ([`DEFAULT_ERROR_SOURCE`] if none was reported).
    #[must_use]
    pub fn error_source(&self) -> &str {
        &self.error_source
    }

    /// Fully-qualified exception class identifier.
    #[must_use]
    pub fn exception_class(&self) -> &str {
        &self.exception_class
    }

    /// Server-side stack trace, possibly multi-line.
    #[must_use]
    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    /// Additional error details.
    #[must_use]
    pub const fn error_details(&self) -> &ErrorDetails {
        &self.error_details
    }

    /// Symbolic error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Documentation URL for this error.
    #[must_use]
    pub fn doc_url(&self) -> Option<&str> {
        self.doc_url.as_deref()
    }

    /// Server-side request id.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service error {}", self.status)?;
        if let Some(code) = self.service_error_code {
            write!(f, " [code {code}]")?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

/// Wire form of an error payload; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireError {
    status: Option<u16>,
    service_error_code: Option<i32>,
    message: Option<String>,
    error_source: Option<String>,
    exception_class: Option<String>,
    stack_trace: Option<String>,
    error_details: Option<ErrorDetails>,
    code: Option<String>,
    doc_url: Option<String>,
    request_id: Option<String>,
}

impl WireError {
    /// Resolve defaults; `fallback_status` is used when the payload omits one.
    pub(crate) fn into_record(self, fallback_status: u16) -> ErrorRecord {
        ErrorRecord {
            status: self.status.unwrap_or(fallback_status),
            service_error_code: self.service_error_code,
            message: self.message.unwrap_or_default(),
            error_source: self
                .error_source
                .unwrap_or_else(|| DEFAULT_ERROR_SOURCE.to_string()),
            exception_class: self.exception_class.unwrap_or_default(),
            stack_trace: self.stack_trace.unwrap_or_default(),
            error_details: self.error_details.unwrap_or_default(),
            code: self.code,
            doc_url: self.doc_url,
            request_id: self.request_id,
        }
    }
}

// ============================================================================
// Raised Failure
// ============================================================================

/// A protocol error raised to the caller.
///
/// Produced when a call fails under
/// [`ErrorHandlingBehavior::FailOnError`](crate::ErrorHandlingBehavior::FailOnError).
/// Never carries an entity.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("{record}")]
pub struct ResponseError {
    #[error(not(source))]
    headers: HashMap<String, String>,
    #[error(not(source))]
    record: ErrorRecord,
}

impl ResponseError {
    /// Creates a raised failure for a call that completed with `status`.
    ///
    /// The record takes the call status, whatever status its payload declared.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, record: ErrorRecord) -> Self {
        Self {
            headers,
            record: record.at_status(status),
        }
    }

    /// HTTP status of the call.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.record.status
    }

    /// Response headers of the failed call.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::raw_response::header_ignore_case(&self.headers, name)
    }

    /// The decoded error record.
    #[must_use]
    pub const fn record(&self) -> &ErrorRecord {
        &self.record
    }

    /// Consume into the decoded error record.
    #[must_use]
    pub fn into_record(self) -> ErrorRecord {
        self.record
    }

    /// Always `false`: a raised failure never comes with a decoded entity.
    #[must_use]
    pub const fn has_decoded_response(&self) -> bool {
        false
    }
}

// ============================================================================
// Shared Accessor Surface
// ============================================================================

/// Read accessors shared by embedded and raised errors.
///
/// Write error inspection once against this trait, whichever
/// [`ErrorHandlingBehavior`](crate::ErrorHandlingBehavior) the call used.
///
/// # Example
///
/// ```ignore
/// fn describe(error: &impl ServiceError) -> String {
///     format!("{} ({:?}): {}", error.status(), error.service_error_code(), error.message())
/// }
///
/// match client.send_with(request, decoder, behavior).await {
///     Ok(response) => response.error().map(describe),
///     Err(Error::Service(raised)) => Some(describe(raised.as_ref())),
///     Err(other) => return Err(other),
/// };
/// ```
pub trait ServiceError {
    /// The underlying decoded record.
    fn error_record(&self) -> &ErrorRecord;

    /// HTTP status code.
    fn status(&self) -> u16 {
        self.error_record().status()
    }

    /// Application-level error code.
    fn service_error_code(&self) -> Option<i32> {
        self.error_record().service_error_code()
    }

    /// Error message.
    fn message(&self) -> &str {
        self.error_record().message()
    }

    /// Error source tag.
    fn error_source(&self) -> &str {
        self.error_record().error_source()
    }

    /// Fully-qualified exception class identifier.
    fn exception_class(&self) -> &str {
        self.error_record().exception_class()
    }

    /// Server-side stack trace.
    fn stack_trace(&self) -> &str {
        self.error_record().stack_trace()
    }

    /// Additional error details.
    fn error_details(&self) -> &ErrorDetails {
        self.error_record().error_details()
    }

    /// Whether an entity was decoded alongside this error. Always `false`.
    fn has_decoded_response(&self) -> bool {
        false
    }
}

impl ServiceError for ErrorRecord {
    fn error_record(&self) -> &ErrorRecord {
        self
    }
}

impl ServiceError for ResponseError {
    fn error_record(&self) -> &ErrorRecord {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn insolence() -> ErrorRecord {
        ErrorRecord::new(406)
            .with_service_error_code(999)
            .with_message("I will not tolerate your insolence!")
            .with_error_source(APP_ERROR_SOURCE)
            .with_error_details(ErrorDetails::from_iter([(
                "reason",
                json!("insultingGreeting"),
            )]))
    }

    #[test]
    fn record_defaults() {
        let record = ErrorRecord::new(500);

        assert_eq!(record.status(), 500);
        assert_eq!(record.service_error_code(), None);
        assert_eq!(record.message(), "");
        assert_eq!(record.error_source(), DEFAULT_ERROR_SOURCE);
        assert_eq!(record.exception_class(), "");
        assert_eq!(record.stack_trace(), "");
        assert!(record.error_details().is_empty());
        assert!(record.code().is_none());
        assert!(record.doc_url().is_none());
        assert!(record.request_id().is_none());
    }

    #[test]
    fn wire_error_resolves_defaults() {
        let record = WireError::default().into_record(503);
        assert_eq!(record, ErrorRecord::new(503));

        let wire = WireError {
            status: Some(406),
            ..WireError::default()
        };
        assert_eq!(wire.into_record(500).status(), 406);
    }

    #[test]
    fn record_display() {
        insta::assert_snapshot!(
            insolence(),
            @"service error 406 [code 999]: I will not tolerate your insolence!"
        );
        insta::assert_snapshot!(ErrorRecord::new(404), @"service error 404");
    }

    #[test]
    fn record_classification() {
        assert!(insolence().is_client_error());
        assert!(!insolence().is_server_error());
        assert!(ErrorRecord::new(502).is_server_error());
    }

    #[test]
    fn details_accessors() {
        let details = ErrorDetails::from_iter([
            ("reason", json!("insultingGreeting")),
            ("limits", json!({"max": 3})),
            ("attempts", json!([1, 2])),
        ]);

        assert_eq!(details.len(), 3);
        assert_eq!(details.get_string("reason"), Some("insultingGreeting"));
        assert_eq!(details.get_string("limits"), None);
        assert_eq!(
            details.get_map("limits").and_then(|m| m.get("max")),
            Some(&json!(3))
        );
        assert_eq!(details.get("attempts"), Some(&json!([1, 2])));
        assert!(details.get("missing").is_none());
    }

    #[test]
    fn raised_and_embedded_share_accessors() {
        fn summary(error: &impl ServiceError) -> (u16, Option<i32>, String, String, bool) {
            (
                error.status(),
                error.service_error_code(),
                error.message().to_string(),
                error.error_source().to_string(),
                error.has_decoded_response(),
            )
        }

        let record = insolence();
        let raised = ResponseError::new(406, HashMap::new(), record.clone());

        assert_eq!(summary(&record), summary(&raised));
        assert_eq!(
            ServiceError::error_details(&raised).get_string("reason"),
            Some("insultingGreeting")
        );
        assert!(!raised.has_decoded_response());
    }

    #[test]
    fn raised_error_display_and_headers() {
        let mut headers = HashMap::new();
        headers.insert("x-restli-error-response".to_string(), "true".to_string());
        let raised = ResponseError::new(406, headers, insolence());

        assert_eq!(raised.header("X-RestLi-Error-Response"), Some("true"));
        assert_eq!(
            raised.to_string(),
            "service error 406 [code 999]: I will not tolerate your insolence!"
        );
        assert_eq!(raised.into_record(), insolence());
    }

    #[test]
    fn raised_error_takes_call_status() {
        let raised = ResponseError::new(500, HashMap::new(), insolence());

        assert_eq!(raised.status(), 500);
        assert_eq!(ServiceError::status(&raised), 500);
        assert_eq!(raised.record().status(), 500);
        assert_eq!(
            raised.to_string(),
            "service error 500 [code 999]: I will not tolerate your insolence!"
        );
    }
}
