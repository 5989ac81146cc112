//! Prelude module for convenient imports.
//!
//! ```ignore
//! use restcall::prelude::*;
//! ```

pub use crate::{
    BatchCreateDecoder, BatchCreateResult, ClientConfig, CreateIdDecoder, EmptyDecoder,
    EntityDecoder, Error, ErrorDecoder, ErrorHandlingBehavior, ErrorRecord, HyperTransport,
    ItemOutcome, JsonDecoder, Method, Request, RequestBuilder, Response, RestClient, Result,
    ServiceError, Transport,
};

pub use serde::{Deserialize, Serialize};
