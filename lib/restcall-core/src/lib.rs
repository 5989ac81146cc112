//! Core types for the restcall RPC client.
//!
//! This crate turns a completed call into what the caller sees:
//! - [`Transport`] - Seam for executing requests
//! - [`Request`] and [`RequestBuilder`] - Outgoing call
//! - [`RawResponse`] and [`Payload`] - Status, headers and payload of a completed call
//! - [`ErrorDecoder`] and [`DefaultErrorDecoder`] - Error payload decoding into [`ErrorRecord`]
//! - [`classify`] and [`EntityDecoder`] - Success or protocol error, by status
//! - [`ErrorHandlingBehavior`] and [`decode_response`] - Raise or embed protocol errors
//! - [`BatchCreateResult`] - Per-item outcomes of batch creates
//! - [`Response`] - Immutable result of a call
//! - [`Error`] and [`Result`] - Error handling
//! - [`StatusCode`] and [`header`] - Re-exported from the `http` crate

mod batch;
mod body;
mod classifier;
mod client;
mod decoder;
mod error;
mod policy;
pub mod prelude;
mod raw_response;
mod record;
mod request;
mod response;

pub use batch::{BatchCreateResult, ItemOutcome, aggregate};
pub use body::{Payload, from_json, from_value, to_json};
pub use classifier::{
    BatchCreateDecoder, Classified, CreateIdDecoder, CreatedId, EmptyDecoder, EntityDecoder,
    ID_HEADER, JsonDecoder, LOCATION_HEADER, classify,
};
pub use client::Transport;
pub use decoder::{DefaultErrorDecoder, ErrorDecoder};
pub use error::{Error, Result};
pub use policy::{ErrorHandlingBehavior, decode_response};
pub use raw_response::{RawResponse, is_success};
pub use record::{
    APP_ERROR_SOURCE, DEFAULT_ERROR_SOURCE, ErrorDetails, ErrorRecord, ResponseError, ServiceError,
};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for methods, status codes and headers
pub use http::{Method, StatusCode, header};
