//! Error-handling behavior.
//!
//! Every call runs under one [`ErrorHandlingBehavior`], chosen per call. It only
//! governs protocol errors (a completed call with a non-2xx status); transport
//! and decode failures are raised whatever the behavior.

use derive_more::Display;
use tracing::debug;

use crate::classifier::{Classified, EntityDecoder, classify};
use crate::decoder::ErrorDecoder;
use crate::raw_response::RawResponse;
use crate::record::ResponseError;
use crate::response::Response;
use crate::{Error, Result};

/// How a protocol error reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum ErrorHandlingBehavior {
    /// Raise protocol errors as [`Error::Service`].
    #[default]
    #[display("FAIL_ON_ERROR")]
    FailOnError,

    /// Return protocol errors embedded in an otherwise normal [`Response`].
    #[display("TREAT_SERVER_ERROR_AS_SUCCESS")]
    TreatServerErrorAsSuccess,
}

impl ErrorHandlingBehavior {
    /// The behavior to use when a call does not specify one.
    #[must_use]
    pub fn resolve(requested: Option<Self>) -> Self {
        requested.unwrap_or_default()
    }

    /// Turn a classified call into its final outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] for a protocol error under
    /// [`ErrorHandlingBehavior::FailOnError`].
    pub fn apply<T>(self, classified: Classified<T>) -> Result<Response<T>> {
        match classified {
            Classified::Success {
                status,
                headers,
                entity,
            } => Ok(Response::from_entity(status, headers, entity)),
            Classified::ProtocolError {
                status,
                headers,
                record,
            } => match self {
                Self::FailOnError => {
                    debug!(
                        status,
                        service_error_code = record.service_error_code(),
                        error_source = record.error_source(),
                        "raising protocol error"
                    );
                    Err(Error::service(ResponseError::new(status, headers, record)))
                }
                Self::TreatServerErrorAsSuccess => {
                    debug!(status, "embedding protocol error in response");
                    Ok(Response::from_error(status, headers, record))
                }
            },
        }
    }
}

/// Classify a completed call, decode it and apply `behavior`.
///
/// This is the whole response pipeline for one call: classification by status,
/// entity or error decoding, then the error-handling behavior.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the payload does not match its expected shape,
/// under any behavior, and [`Error::Service`] for a protocol error under
/// [`ErrorHandlingBehavior::FailOnError`].
pub fn decode_response<D>(
    response: RawResponse,
    decoder: &D,
    errors: &dyn ErrorDecoder,
    behavior: ErrorHandlingBehavior,
) -> Result<Response<D::Entity>>
where
    D: EntityDecoder + ?Sized,
{
    let classified = classify(response, decoder, errors)?;
    behavior.apply(classified)
}
