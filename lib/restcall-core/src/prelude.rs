//! Prelude module for convenient imports.
//!
//! ```ignore
//! use restcall_core::prelude::*;
//! ```

pub use crate::{
    BatchCreateDecoder, BatchCreateResult, CreateIdDecoder, DefaultErrorDecoder, EmptyDecoder,
    EntityDecoder, Error, ErrorDecoder, ErrorHandlingBehavior, ErrorRecord, ItemOutcome,
    JsonDecoder, Method, Request, RequestBuilder, Response, Result, ServiceError, Transport,
};
