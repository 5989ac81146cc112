//! Response classification.
//!
//! [`classify`] splits a completed call into success and protocol error by
//! status, then decodes exactly one side: the entity through an
//! [`EntityDecoder`] for 2xx statuses, the error body through an
//! [`ErrorDecoder`] for everything else.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::Result;
use crate::batch::{BatchCreateResult, aggregate, decode_key};
use crate::decoder::ErrorDecoder;
use crate::raw_response::{RawResponse, is_success};
use crate::record::ErrorRecord;

/// Header carrying the id of a created entity.
pub const ID_HEADER: &str = "X-RestLi-Id";

/// Header carrying the location of a created entity.
pub const LOCATION_HEADER: &str = "Location";

// ============================================================================
// Entity Decoders
// ============================================================================

/// Declares the shape of a call's success entity and how to decode it.
///
/// Only invoked for 2xx responses.
pub trait EntityDecoder: Send + Sync {
    /// The decoded entity type.
    type Entity: Send;

    /// Decode the success entity of `response`.
    ///
    /// `errors` decodes embedded per-item errors for shapes that carry them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the payload does not match the shape.
    fn decode_entity(
        &self,
        response: &RawResponse,
        errors: &dyn ErrorDecoder,
    ) -> Result<Self::Entity>;
}

/// Decodes the payload as a JSON entity of type `T`.
pub struct JsonDecoder<T> {
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    /// Creates a decoder for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonDecoder<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for JsonDecoder<T> {}

impl<T> fmt::Debug for JsonDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonDecoder")
            .field("entity", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned + Send> EntityDecoder for JsonDecoder<T> {
    type Entity = T;

    fn decode_entity(&self, response: &RawResponse, _errors: &dyn ErrorDecoder) -> Result<T> {
        response.payload().decode()
    }
}

/// Ignores the success payload.
///
/// For calls without a meaningful response body: updates, deletes, actions
/// returning nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDecoder;

impl EntityDecoder for EmptyDecoder {
    type Entity = ();

    fn decode_entity(&self, _response: &RawResponse, _errors: &dyn ErrorDecoder) -> Result<()> {
        Ok(())
    }
}

/// Id assigned by the server to a created entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedId<K> {
    id: Option<K>,
    location: Option<String>,
}

impl<K> CreatedId<K> {
    /// The decoded id, if the server reported one.
    #[must_use]
    pub const fn id(&self) -> Option<&K> {
        self.id.as_ref()
    }

    /// The `Location` header, if present.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Consume into the decoded id.
    #[must_use]
    pub fn into_id(self) -> Option<K> {
        self.id
    }
}

/// Decodes the id of a single created entity from the response headers.
///
/// The id is read from [`ID_HEADER`], falling back to the last path segment of
/// [`LOCATION_HEADER`]. The body is ignored.
pub struct CreateIdDecoder<K> {
    _key: PhantomData<fn() -> K>,
}

impl<K> CreateIdDecoder<K> {
    /// Creates a decoder for ids of type `K`.
    #[must_use]
    pub const fn new() -> Self {
        Self { _key: PhantomData }
    }
}

impl<K> Default for CreateIdDecoder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for CreateIdDecoder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateIdDecoder")
            .field("key", &std::any::type_name::<K>())
            .finish()
    }
}

impl<K: DeserializeOwned + Send> EntityDecoder for CreateIdDecoder<K> {
    type Entity = CreatedId<K>;

    fn decode_entity(
        &self,
        response: &RawResponse,
        _errors: &dyn ErrorDecoder,
    ) -> Result<CreatedId<K>> {
        let location = response.header(LOCATION_HEADER).map(str::to_string);
        let raw_id = response.header(ID_HEADER).or_else(|| {
            location
                .as_deref()
                .and_then(|loc| loc.trim_end_matches('/').rsplit('/').next())
                .filter(|segment| !segment.is_empty())
        });

        let id = raw_id
            .map(|raw| {
                decode_key(&Value::String(raw.to_string())).map_err(|err| match err {
                    crate::Error::Decode { message, .. } => crate::Error::decode(ID_HEADER, message),
                    other => other,
                })
            })
            .transpose()?;

        Ok(CreatedId { id, location })
    }
}

/// Decodes the positional outcomes of a batch create call.
#[derive(Debug, Clone, Copy)]
pub struct BatchCreateDecoder<K> {
    submitted: usize,
    _key: PhantomData<fn() -> K>,
}

impl<K> BatchCreateDecoder<K> {
    /// Creates a decoder expecting `submitted` outcomes.
    #[must_use]
    pub const fn new(submitted: usize) -> Self {
        Self {
            submitted,
            _key: PhantomData,
        }
    }

    /// Creates a decoder expecting one outcome per submitted item.
    #[must_use]
    pub const fn for_items<I>(items: &[I]) -> Self {
        Self::new(items.len())
    }

    /// Number of submitted items.
    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }
}

impl<K: DeserializeOwned + Send> EntityDecoder for BatchCreateDecoder<K> {
    type Entity = BatchCreateResult<K>;

    fn decode_entity(
        &self,
        response: &RawResponse,
        errors: &dyn ErrorDecoder,
    ) -> Result<BatchCreateResult<K>> {
        aggregate(self.submitted, response.payload(), errors)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Outcome of classifying a completed call.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified<T> {
    /// 2xx status with a decoded entity.
    Success {
        /// HTTP status code.
        status: u16,
        /// Response headers.
        headers: HashMap<String, String>,
        /// Decoded entity.
        entity: T,
    },
    /// Non-2xx status with a decoded error body.
    ProtocolError {
        /// HTTP status code.
        status: u16,
        /// Response headers.
        headers: HashMap<String, String>,
        /// Decoded error.
        record: ErrorRecord,
    },
}

impl<T> Classified<T> {
    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } | Self::ProtocolError { status, .. } => *status,
        }
    }
}

/// Classify a completed call and decode its entity or its error.
///
/// Entity decoding is never attempted on a non-2xx payload. A decoded error
/// record always carries the call status.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] if the selected side cannot be decoded.
/// Protocol errors are not errors here; they come back as
/// [`Classified::ProtocolError`].
pub fn classify<D>(
    response: RawResponse,
    decoder: &D,
    errors: &dyn ErrorDecoder,
) -> Result<Classified<D::Entity>>
where
    D: EntityDecoder + ?Sized,
{
    let status = response.status();

    if is_success(status) {
        trace!(status, "decoding success entity");
        let entity = decoder.decode_entity(&response, errors)?;
        let (status, headers, _) = response.into_parts();
        return Ok(Classified::Success {
            status,
            headers,
            entity,
        });
    }

    let (status, headers, payload) = response.into_parts();
    let decoded = errors.decode(status, &payload)?;
    if decoded.status() != status {
        trace!(
            status,
            payload_status = decoded.status(),
            "error payload status differs from call status"
        );
    }
    let record = decoded.at_status(status);
    debug!(
        status,
        service_error_code = record.service_error_code(),
        "decoded protocol error"
    );
    Ok(Classified::ProtocolError {
        status,
        headers,
        record,
    })
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::Error;
    use crate::decoder::DefaultErrorDecoder;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Greeting {
        id: u64,
        message: String,
    }

    fn raw(status: u16, body: &'static str) -> RawResponse {
        RawResponse::new(status, HashMap::new(), Bytes::from_static(body.as_bytes()))
    }

    fn with_header(status: u16, name: &str, value: &str) -> RawResponse {
        let mut headers = HashMap::new();
        headers.insert(name.to_string(), value.to_string());
        RawResponse::new(status, headers, Bytes::new())
    }

    #[test]
    fn success_decodes_entity() {
        let classified = classify(
            raw(200, r#"{"id": 1, "message": "Hello"}"#),
            &JsonDecoder::<Greeting>::new(),
            &DefaultErrorDecoder,
        )
        .expect("classify");

        let_assert!(Classified::Success { status, entity, .. } = classified);
        check!(status == 200);
        check!(entity.message == "Hello");
    }

    #[test]
    fn error_status_never_decodes_entity() {
        // Body matches the entity type, but the status says it is an error.
        let classified = classify(
            raw(500, r#"{"id": 1, "message": "Hello", "status": 500}"#),
            &JsonDecoder::<Greeting>::new(),
            &DefaultErrorDecoder,
        )
        .expect("classify");

        let_assert!(Classified::ProtocolError { status, record, .. } = classified);
        check!(status == 500);
        check!(record.message() == "Hello");
    }

    #[test]
    fn error_record_takes_call_status() {
        let classified = classify(
            raw(500, r#"{"status": 406, "message": "not acceptable"}"#),
            &EmptyDecoder,
            &DefaultErrorDecoder,
        )
        .expect("classify");

        let_assert!(Classified::ProtocolError { status, record, .. } = classified);
        check!(status == 500);
        check!(record.status() == 500);
        check!(record.message() == "not acceptable");
    }

    #[test]
    fn non_2xx_statuses_are_errors() {
        for status in [199, 300, 304, 404, 500, 503] {
            let classified = classify(raw(status, ""), &EmptyDecoder, &DefaultErrorDecoder)
                .expect("classify");
            check!(
                matches!(classified, Classified::ProtocolError { .. }),
                "status {status}"
            );
            check!(classified.status() == status);
        }
    }

    #[test]
    fn malformed_success_payload_is_a_decode_failure() {
        let result = classify(
            raw(200, r#"{"id": "one"}"#),
            &JsonDecoder::<Greeting>::new(),
            &DefaultErrorDecoder,
        );

        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == "id");
    }

    #[test]
    fn malformed_error_payload_is_a_decode_failure() {
        let result = classify(raw(500, "<html>oops</html>"), &EmptyDecoder, &DefaultErrorDecoder);
        check!(result.is_err_and(|err| err.is_decode()));
    }

    #[test]
    fn structured_payload_is_classified() {
        let response = RawResponse::structured(
            200,
            HashMap::new(),
            json!({"id": 3, "message": "pre-parsed"}),
        );

        let classified =
            classify(response, &JsonDecoder::<Greeting>::new(), &DefaultErrorDecoder)
                .expect("classify");

        let_assert!(Classified::Success { entity, .. } = classified);
        check!(entity == Greeting { id: 3, message: "pre-parsed".to_string() });
    }

    #[test]
    fn empty_decoder_ignores_body() {
        let classified =
            classify(raw(204, "not json"), &EmptyDecoder, &DefaultErrorDecoder).expect("classify");
        check!(classified == Classified::Success { status: 204, headers: HashMap::new(), entity: () });
    }

    #[test]
    fn create_id_from_id_header() {
        let decoder = CreateIdDecoder::<u64>::new();
        let created = decoder
            .decode_entity(&with_header(201, "x-restli-id", "42"), &DefaultErrorDecoder)
            .expect("decode");

        check!(created.id() == Some(&42));
        check!(created.location().is_none());
    }

    #[test]
    fn create_id_from_location_header() {
        let decoder = CreateIdDecoder::<String>::new();
        let created = decoder
            .decode_entity(
                &with_header(201, "Location", "/greetings/10/"),
                &DefaultErrorDecoder,
            )
            .expect("decode");

        check!(created.id() == Some(&"10".to_string()));
        check!(created.location() == Some("/greetings/10/"));
    }

    #[test]
    fn create_id_absent() {
        let created = CreateIdDecoder::<String>::new()
            .decode_entity(&raw(201, ""), &DefaultErrorDecoder)
            .expect("decode");
        check!(created.into_id().is_none());
    }

    #[test]
    fn create_id_type_mismatch_is_a_decode_failure() {
        let result = CreateIdDecoder::<u64>::new()
            .decode_entity(&with_header(201, ID_HEADER, "abc"), &DefaultErrorDecoder);

        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == ID_HEADER);
    }

    #[test]
    fn batch_decoder_counts_submitted_items() {
        let items = ["a", "b"];
        let decoder = BatchCreateDecoder::<String>::for_items(&items);
        check!(decoder.submitted() == 2);

        let classified = classify(
            raw(200, r#"[{"id": "1", "status": 201}, {"status": 400}]"#),
            &decoder,
            &DefaultErrorDecoder,
        )
        .expect("classify");

        let_assert!(Classified::Success { entity, .. } = classified);
        check!(entity.len() == 2);
        check!(entity.has_failures());
    }
}
