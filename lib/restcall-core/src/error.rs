//! Error types for restcall.
//!
//! Failures fall in four families:
//!
//! - transport failures ([`Error::Connection`], [`Error::Tls`], [`Error::Timeout`],
//!   [`Error::ResponseTooLarge`]): the call never completed,
//! - protocol errors ([`Error::Service`]): the call completed with a non-2xx status
//!   and a decodable error body, raised because the call ran with
//!   [`ErrorHandlingBehavior::FailOnError`](crate::ErrorHandlingBehavior::FailOnError),
//! - decode failures ([`Error::Decode`]): a payload did not match its expected shape,
//! - caller mistakes ([`Error::InvalidState`], [`Error::InvalidRequest`], ...).
//!
//! Only protocol errors are subject to the per-call error-handling behavior.
//! Everything else always unwinds the call.

use derive_more::{Display, Error, From};

use crate::record::{ErrorRecord, ResponseError};

/// Main error type for restcall operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with an error status and a decoded error body.
    #[display("{_0}")]
    #[from(skip)]
    Service(#[error(not(source))] Box<ResponseError>),

    /// A success or error payload could not be decoded into its expected shape.
    #[display("decode error at '{path}': {message}")]
    #[from(skip)]
    Decode {
        /// JSON path to the offending value (e.g., `[1].error.status`).
        path: String,
        /// Error message.
        message: String,
    },

    /// An accessor was used on a response that cannot honor it.
    #[display("invalid state: {_0}")]
    #[from(skip)]
    InvalidState(#[error(not(source))] String),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The response body exceeded the configured maximum size.
    #[display("response too large ({size} bytes exceeded max of {max})")]
    #[from(skip)]
    ResponseTooLarge {
        /// Size of the received body.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Raise a decoded error record as a protocol error.
    #[must_use]
    pub fn service(error: ResponseError) -> Self {
        Self::Service(Box::new(error))
    }

    /// Create a decode error with path context.
    #[must_use]
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if the call never completed.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Tls(_) | Self::Timeout | Self::ResponseTooLarge { .. }
        )
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if a payload could not be decoded.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns `true` if this is a raised protocol error.
    #[must_use]
    pub const fn is_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    /// Returns `true` if this is an invalid state error.
    #[must_use]
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// The raised protocol error, if any.
    #[must_use]
    pub fn service_error(&self) -> Option<&ResponseError> {
        match self {
            Self::Service(error) => Some(error),
            _ => None,
        }
    }

    /// Consume into the raised protocol error, if any.
    #[must_use]
    pub fn into_service_error(self) -> Option<ResponseError> {
        match self {
            Self::Service(error) => Some(*error),
            _ => None,
        }
    }

    /// The decoded error record carried by a raised protocol error.
    #[must_use]
    pub fn record(&self) -> Option<&ErrorRecord> {
        self.service_error().map(ResponseError::record)
    }

    /// Returns the HTTP status code if this is a raised protocol error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.service_error().map(ResponseError::status)
    }

    /// Returns `true` if this is a raised client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a raised server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn raised(status: u16) -> Error {
        Error::service(ResponseError::new(
            status,
            HashMap::new(),
            ErrorRecord::new(status).with_message("boom"),
        ))
    }

    #[test]
    fn error_display() {
        insta::assert_snapshot!(Error::Timeout, @"request timeout");
        insta::assert_snapshot!(
            Error::connection("failed to connect"),
            @"connection error: failed to connect"
        );
        insta::assert_snapshot!(
            Error::decode("[1].status", "invalid type: string \"x\", expected u16"),
            @r#"decode error at '[1].status': invalid type: string "x", expected u16"#
        );
        insta::assert_snapshot!(
            Error::ResponseTooLarge { size: 10, max: 4 },
            @"response too large (10 bytes exceeded max of 4)"
        );
    }

    #[test]
    fn error_families() {
        assert!(Error::Timeout.is_transport());
        assert!(Error::connection("refused").is_transport());
        assert!(Error::tls("bad certificate").is_transport());
        assert!(!Error::decode("", "eof").is_transport());
        assert!(!raised(500).is_transport());

        assert!(Error::decode("", "eof").is_decode());
        assert!(raised(500).is_service());
        assert!(Error::invalid_state("no entity").is_invalid_state());
    }

    #[test]
    fn error_status() {
        let err = raised(404);
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = raised(500);
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_client_error());
        assert!(err.is_server_error());

        let err = Error::Timeout;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn error_service_accessors() {
        let err = raised(503);
        let record = err.record().expect("raised error carries a record");
        assert_eq!(record.message(), "boom");

        let service = err.into_service_error().expect("service error");
        assert_eq!(service.status(), 503);
        assert!(!service.has_decoded_response());

        assert!(Error::Timeout.into_service_error().is_none());
    }
}
