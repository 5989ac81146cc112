//! Async RPC client with structured server errors.
//!
//! Every call completes in one of three ways: a decoded entity, a protocol
//! error (non-2xx status with a decoded [`ErrorRecord`]), or a transport or
//! decode failure. The per-call [`ErrorHandlingBehavior`] decides whether a
//! protocol error is raised as [`Error::Service`] or handed back inside the
//! [`Response`].
//!
//! # Example
//!
//! ```ignore
//! use restcall::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct Greeting {
//!     id: u64,
//!     message: String,
//! }
//!
//! let client = RestClient::new();
//! let request = Request::builder(Method::GET, "https://api.example.com/greetings/1".parse()?).build();
//!
//! match client.fetch::<Greeting>(request).await {
//!     Ok(response) => println!("{:?}", response.entity()?),
//!     Err(Error::Service(error)) => println!("{}: {}", error.status(), error.message()),
//!     Err(other) => return Err(other),
//! }
//! ```

mod config;
mod connector;
pub mod prelude;
mod rest_client;
mod transport;

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_MAX_RESPONSE_SIZE};
pub use connector::https_connector;
pub use rest_client::RestClient;
pub use transport::HyperTransport;

// Re-export core types
pub use restcall_core::{
    APP_ERROR_SOURCE, BatchCreateDecoder, BatchCreateResult, Classified, CreateIdDecoder,
    CreatedId, DEFAULT_ERROR_SOURCE, DefaultErrorDecoder, EmptyDecoder, EntityDecoder, Error,
    ErrorDecoder, ErrorDetails, ErrorHandlingBehavior, ErrorRecord, ID_HEADER, ItemOutcome,
    JsonDecoder, LOCATION_HEADER, Payload, RawResponse, Request, RequestBuilder, Response,
    ResponseError, Result, ServiceError, Transport, aggregate, classify, decode_response,
    from_json, from_value, is_success, to_json,
};

// Re-export http types for methods, status codes and headers
pub use restcall_core::{Method, StatusCode, header};

pub use url;
