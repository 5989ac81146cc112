//! Batch create outcomes.
//!
//! A batch create call succeeds or fails as a whole at the call level, but
//! every submitted item also gets its own outcome. Item failures are data:
//! they never turn the call into a failure, whatever the error-handling
//! behavior. Callers inspect each [`ItemOutcome`] instead.
//!
//! Wire format, either bare or wrapped in `{"elements": [...]}`:
//!
//! ```json
//! [
//!   { "id": "10", "status": 201 },
//!   { "status": 406, "error": { "status": 406, "message": "..." } }
//! ]
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::body::{Payload, from_json, from_value};
use crate::decoder::ErrorDecoder;
use crate::raw_response::is_success;
use crate::record::ErrorRecord;
use crate::{Error, Result};

/// Outcome of a single submitted item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome<K> {
    status: u16,
    result: std::result::Result<K, ErrorRecord>,
}

impl<K> ItemOutcome<K> {
    /// A created item with its assigned id.
    #[must_use]
    pub const fn created(status: u16, id: K) -> Self {
        Self {
            status,
            result: Ok(id),
        }
    }

    /// A failed item with its decoded error.
    #[must_use]
    pub const fn failed(status: u16, error: ErrorRecord) -> Self {
        Self {
            status,
            result: Err(error),
        }
    }

    /// Item status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Assigned id, if the item was created.
    #[must_use]
    pub fn id(&self) -> Option<&K> {
        self.result.as_ref().ok()
    }

    /// Decoded error, if the item failed.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorRecord> {
        self.result.as_ref().err()
    }

    /// Returns `true` if the item failed.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.result.is_err()
    }

    /// Consume into the id or the error.
    ///
    /// # Errors
    ///
    /// Returns the item's [`ErrorRecord`] if it failed.
    pub fn into_result(self) -> std::result::Result<K, ErrorRecord> {
        self.result
    }
}

/// Ordered outcomes of a batch create call, one per submitted item.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCreateResult<K> {
    elements: Vec<ItemOutcome<K>>,
}

impl<K> BatchCreateResult<K> {
    /// Outcomes in submission order.
    #[must_use]
    pub fn elements(&self) -> &[ItemOutcome<K>] {
        &self.elements
    }

    /// Outcome of the item submitted at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ItemOutcome<K>> {
        self.elements.get(index)
    }

    /// Number of outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over outcomes in submission order.
    pub fn iter(&self) -> std::slice::Iter<'_, ItemOutcome<K>> {
        self.elements.iter()
    }

    /// Returns `true` if at least one item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.elements.iter().any(ItemOutcome::has_error)
    }

    /// Failed items with their submission index.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ErrorRecord)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.error().map(|error| (index, error)))
    }

    /// Ids of created items with their submission index.
    pub fn ids(&self) -> impl Iterator<Item = (usize, &K)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.id().map(|id| (index, id)))
    }

    /// Consume into the outcome vector.
    #[must_use]
    pub fn into_elements(self) -> Vec<ItemOutcome<K>> {
        self.elements
    }
}

impl<K> IntoIterator for BatchCreateResult<K> {
    type Item = ItemOutcome<K>;
    type IntoIter = std::vec::IntoIter<ItemOutcome<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, K> IntoIterator for &'a BatchCreateResult<K> {
    type Item = &'a ItemOutcome<K>;
    type IntoIter = std::slice::Iter<'a, ItemOutcome<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: Option<Value>,
    status: u16,
    error: Option<Value>,
}

/// Decode a batch create payload into positional outcomes.
///
/// `submitted` is the number of items sent; the payload must hold exactly
/// that many outcomes. Each item is classified by its own status, and item
/// errors go through `errors`.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the payload is not a sequence of outcomes,
/// if the outcome count differs from `submitted`, or if a created item has no
/// decodable id. Item-level failures are not errors.
pub fn aggregate<K: DeserializeOwned>(
    submitted: usize,
    payload: &Payload,
    errors: &dyn ErrorDecoder,
) -> Result<BatchCreateResult<K>> {
    let (prefix, items) = wire_items(payload)?;

    if items.len() != submitted {
        return Err(Error::decode(
            prefix,
            format!(
                "expected {submitted} batch outcomes, received {}",
                items.len()
            ),
        ));
    }

    let elements = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| item_outcome(&prefix, index, item, errors))
        .collect::<Result<Vec<_>>>()?;

    let result = BatchCreateResult { elements };
    debug!(
        items = result.len(),
        failed = result.failures().count(),
        "batch outcomes decoded"
    );
    Ok(result)
}

fn wire_items(payload: &Payload) -> Result<(String, Vec<WireItem>)> {
    if payload.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let parsed: Value;
    let value = match payload {
        Payload::Bytes(bytes) => {
            parsed = from_json(bytes)?;
            &parsed
        }
        Payload::Structured(value) => value,
    };

    match value {
        Value::Array(_) => Ok((String::new(), from_value(value)?)),
        Value::Object(envelope) => {
            let elements = envelope
                .get("elements")
                .ok_or_else(|| Error::decode("", "missing field `elements`"))?;
            let items = from_value(elements).map_err(|err| match err {
                Error::Decode { path, message } => {
                    Error::decode(format!("elements{}", dotted(&path)), message)
                }
                other => other,
            })?;
            Ok(("elements".to_string(), items))
        }
        other => Err(Error::decode(
            "",
            format!("expected a sequence of batch outcomes, found {other}"),
        )),
    }
}

fn item_outcome<K: DeserializeOwned>(
    prefix: &str,
    index: usize,
    item: WireItem,
    errors: &dyn ErrorDecoder,
) -> Result<ItemOutcome<K>> {
    let path = |field: &str| format!("{prefix}[{index}].{field}");

    if let Some(error) = item.error {
        let record = errors
            .decode(item.status, &Payload::Structured(error))
            .map_err(|err| match err {
                Error::Decode { path: inner, message } => {
                    Error::decode(format!("{}{}", path("error"), dotted(&inner)), message)
                }
                other => other,
            })?;
        debug!(index, status = item.status, "batch item failed");
        return Ok(ItemOutcome::failed(item.status, record));
    }

    if !is_success(item.status) {
        debug!(index, status = item.status, "batch item failed without error body");
        return Ok(ItemOutcome::failed(item.status, ErrorRecord::new(item.status)));
    }

    let id = item
        .id
        .ok_or_else(|| Error::decode(path("id"), "missing id for created item"))?;
    let id = decode_key(&id).map_err(|err| match err {
        Error::Decode { message, .. } => Error::decode(path("id"), message),
        other => other,
    })?;
    Ok(ItemOutcome::created(item.status, id))
}

/// Decode a key, accepting string-encoded forms of non-string keys.
pub(crate) fn decode_key<K: DeserializeOwned>(value: &Value) -> Result<K> {
    match from_value(value) {
        Ok(key) => Ok(key),
        Err(err) => match value {
            Value::String(text) => from_json(text.as_bytes()).map_err(|_| err),
            _ => Err(err),
        },
    }
}

/// Render a nested path so it can be appended to a parent path.
fn dotted(path: &str) -> String {
    match path {
        "" | "." => String::new(),
        p if p.starts_with('[') => p.to_string(),
        p => format!(".{p}"),
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::decoder::DefaultErrorDecoder;

    fn insolence() -> Value {
        json!({
            "status": 406,
            "serviceErrorCode": 999,
            "message": "I will not tolerate your insolence!",
            "errorSource": "APP",
            "exceptionClass": "greetings.server.InsultException",
            "stackTrace": "greetings.server.InsultException [HTTP Status:406, serviceErrorCode:999]: I will not tolerate your insolence!",
            "errorDetails": {"reason": "insultingGreeting"}
        })
    }

    #[test]
    fn mixed_outcomes_keep_submission_order() {
        let payload = Payload::from(json!([
            {"id": "10", "status": 201},
            {"status": 406, "error": insolence()}
        ]));

        let result: BatchCreateResult<String> =
            aggregate(2, &payload, &DefaultErrorDecoder).expect("aggregate");

        check!(result.len() == 2);

        let_assert!(Some(first) = result.get(0));
        check!(first.status() == 201);
        check!(first.id() == Some(&"10".to_string()));
        check!(!first.has_error());

        let_assert!(Some(second) = result.get(1));
        check!(second.status() == 406);
        check!(second.id().is_none());
        let_assert!(Some(error) = second.error());
        check!(error.service_error_code() == Some(999));
        check!(error.message() == "I will not tolerate your insolence!");
        check!(error.exception_class() == "greetings.server.InsultException");
        check!(error.error_details().get_string("reason") == Some("insultingGreeting"));

        check!(result.has_failures());
        check!(result.failures().map(|(i, _)| i).collect::<Vec<_>>() == vec![1]);
        check!(result.ids().map(|(i, _)| i).collect::<Vec<_>>() == vec![0]);
    }

    #[test]
    fn all_items_failing_is_not_an_error() {
        let payload = Payload::from(json!([
            {"status": 406, "error": insolence()},
            {"status": 500, "error": {"status": 500, "message": "boom"}},
            {"status": 409}
        ]));

        let result: BatchCreateResult<u64> =
            aggregate(3, &payload, &DefaultErrorDecoder).expect("aggregate");

        check!(result.failures().count() == 3);
        let_assert!(Some(third) = result.get(2));
        check!(third.error() == Some(&ErrorRecord::new(409)));
    }

    #[test]
    fn duplicate_outcomes_are_kept() {
        let payload = Payload::from(json!([
            {"id": 7, "status": 201},
            {"id": 7, "status": 201}
        ]));

        let result: BatchCreateResult<u64> =
            aggregate(2, &payload, &DefaultErrorDecoder).expect("aggregate");

        check!(result.ids().map(|(_, id)| *id).collect::<Vec<_>>() == vec![7, 7]);
    }

    #[test]
    fn empty_submission_yields_empty_outcomes() {
        let result: BatchCreateResult<String> =
            aggregate(0, &Payload::from("[]"), &DefaultErrorDecoder).expect("aggregate");
        check!(result.is_empty());

        let result: BatchCreateResult<String> =
            aggregate(0, &Payload::from(""), &DefaultErrorDecoder).expect("aggregate");
        check!(result.is_empty());
    }

    #[test]
    fn elements_envelope_is_accepted() {
        let payload = Payload::from(r#"{"elements": [{"id": "10", "status": 201}]}"#);

        let result: BatchCreateResult<String> =
            aggregate(1, &payload, &DefaultErrorDecoder).expect("aggregate");

        check!(result.ids().map(|(_, id)| id.as_str()).collect::<Vec<_>>() == vec!["10"]);
    }

    #[test]
    fn string_ids_decode_into_numeric_keys() {
        let payload = Payload::from(json!([{"id": "10", "status": 201}]));

        let result: BatchCreateResult<u64> =
            aggregate(1, &payload, &DefaultErrorDecoder).expect("aggregate");

        check!(result.get(0).and_then(ItemOutcome::id) == Some(&10));
    }

    #[test]
    fn count_mismatch_is_a_decode_failure() {
        let payload = Payload::from(json!([{"id": "10", "status": 201}]));

        let result = aggregate::<String>(2, &payload, &DefaultErrorDecoder);

        let_assert!(Err(Error::Decode { message, .. }) = result);
        check!(message == "expected 2 batch outcomes, received 1");
    }

    #[test]
    fn created_item_without_id_is_a_decode_failure() {
        let payload = Payload::from(json!([{"id": "10", "status": 201}, {"status": 201}]));

        let result = aggregate::<String>(2, &payload, &DefaultErrorDecoder);

        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == "[1].id");
    }

    #[test]
    fn malformed_item_error_reports_path() {
        let payload = Payload::from(json!({
            "elements": [{"status": 406, "error": {"status": "bad"}}]
        }));

        let result = aggregate::<String>(1, &payload, &DefaultErrorDecoder);

        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == "elements[0].error.status");
    }

    #[test]
    fn item_missing_status_reports_path() {
        let payload = Payload::from(json!([{"id": "10"}]));

        let result = aggregate::<String>(1, &payload, &DefaultErrorDecoder);

        let_assert!(Err(Error::Decode { path, .. }) = result);
        check!(path == "[0]");
    }

    #[test]
    fn non_sequence_payload_is_a_decode_failure() {
        let result = aggregate::<String>(1, &Payload::from("42"), &DefaultErrorDecoder);
        check!(result.is_err_and(|err| err.is_decode()));

        let result = aggregate::<String>(1, &Payload::from(r#"{"items": []}"#), &DefaultErrorDecoder);
        check!(result.is_err_and(|err| err.is_decode()));
    }

    #[test]
    fn item_into_result() {
        let created = ItemOutcome::created(201, "10".to_string());
        check!(created.into_result() == Ok("10".to_string()));

        let failed: ItemOutcome<String> = ItemOutcome::failed(406, ErrorRecord::new(406));
        check!(failed.into_result() == Err(ErrorRecord::new(406)));
    }
}
