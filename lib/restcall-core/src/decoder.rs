//! Error payload decoding.

use tracing::trace;

use crate::Result;
use crate::body::Payload;
use crate::record::{ErrorRecord, WireError};

/// Trait for decoding error payloads into [`ErrorRecord`]s.
///
/// Implement this trait to support servers whose error bodies do not follow
/// the default wire schema. The decoder is called for the body of every
/// non-2xx call and for the error sub-payload of every failed batch item.
///
/// # Example
///
/// ```ignore
/// use restcall_core::{ErrorDecoder, ErrorRecord, Payload, Result};
///
/// #[derive(Deserialize)]
/// struct LegacyError {
///     reason: String,
/// }
///
/// struct LegacyErrorDecoder;
///
/// impl ErrorDecoder for LegacyErrorDecoder {
///     fn decode(&self, status: u16, payload: &Payload) -> Result<ErrorRecord> {
///         let legacy: LegacyError = payload.decode()?;
///         Ok(ErrorRecord::new(status).with_message(legacy.reason))
///     }
/// }
/// ```
pub trait ErrorDecoder: Send + Sync + 'static {
    /// Decode an error payload.
    ///
    /// `status` is the status the payload was delivered with: the call status
    /// for a failed call, the item status for a failed batch item.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the payload cannot be parsed. Such
    /// failures are never subject to the error-handling behavior.
    fn decode(&self, status: u16, payload: &Payload) -> Result<ErrorRecord>;
}

/// Decoder for the default error wire schema.
///
/// ```json
/// {
///   "status": 406,
///   "serviceErrorCode": 999,
///   "message": "I will not tolerate your insolence!",
///   "errorSource": "APP",
///   "exceptionClass": "greetings.InsultException",
///   "stackTrace": "...",
///   "errorDetails": { "reason": "insultingGreeting" }
/// }
/// ```
///
/// Every field is optional. Missing fields take the defaults documented on
/// [`ErrorRecord`]; a missing `status` falls back to the delivery status,
/// and an empty payload yields a record holding only that status.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorDecoder;

impl ErrorDecoder for DefaultErrorDecoder {
    fn decode(&self, status: u16, payload: &Payload) -> Result<ErrorRecord> {
        if payload.is_empty() {
            trace!(status, "empty error payload");
            return Ok(ErrorRecord::new(status));
        }

        let wire: WireError = payload.decode()?;
        Ok(wire.into_record(status))
    }
}
