//! Decoded call results.
//!
//! [`Response`] is what a call hands back when it completes normally. It holds
//! either the decoded entity, or, for calls made with
//! [`ErrorHandlingBehavior::TreatServerErrorAsSuccess`](crate::ErrorHandlingBehavior),
//! the decoded error of a failed call.
//!
//! # Example
//!
//! ```ignore
//! let response = client
//!     .send_with(request, JsonDecoder::<Greeting>::new(), ErrorHandlingBehavior::TreatServerErrorAsSuccess)
//!     .await?;
//!
//! if let Some(error) = response.error() {
//!     println!("{} failed: {}", response.status(), error.message());
//! } else {
//!     let greeting = response.entity()?;
//! }
//! ```

use std::collections::HashMap;

use crate::record::{ErrorRecord, ResponseError};
use crate::{Error, Result};

/// Immutable result of a completed call.
///
/// Exactly one of entity and error is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    status: u16,
    headers: HashMap<String, String>,
    body: Body<T>,
}

#[derive(Debug, Clone, PartialEq)]
enum Body<T> {
    Entity(T),
    Error(ErrorRecord),
}

impl<T> Response<T> {
    pub(crate) fn from_entity(status: u16, headers: HashMap<String, String>, entity: T) -> Self {
        Self {
            status,
            headers,
            body: Body::Entity(entity),
        }
    }

    pub(crate) fn from_error(status: u16, headers: HashMap<String, String>, error: ErrorRecord) -> Self {
        Self {
            status,
            headers,
            body: Body::Error(error),
        }
    }

    /// HTTP status code of the call.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::raw_response::header_ignore_case(&self.headers, name)
    }

    /// The decoded entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the call failed and its error was
    /// embedded instead of raised.
    pub fn entity(&self) -> Result<&T> {
        match &self.body {
            Body::Entity(entity) => Ok(entity),
            Body::Error(error) => Err(no_entity(self.status, error)),
        }
    }

    /// Consume into the decoded entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the response carries an embedded error.
    pub fn into_entity(self) -> Result<T> {
        match self.body {
            Body::Entity(entity) => Ok(entity),
            Body::Error(error) => Err(no_entity(self.status, &error)),
        }
    }

    /// The embedded error, if the call failed.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorRecord> {
        match &self.body {
            Body::Entity(_) => None,
            Body::Error(error) => Some(error),
        }
    }

    /// Returns `true` if the response carries an embedded error.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        matches!(self.body, Body::Error(_))
    }

    /// Convert an embedded error into a raised one.
    ///
    /// Lets a caller that asked for embedded errors fall back to fail-fast
    /// handling at a later point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] carrying the embedded error.
    pub fn into_result(self) -> Result<T> {
        match self.body {
            Body::Entity(entity) => Ok(entity),
            Body::Error(error) => Err(Error::service(ResponseError::new(
                self.status,
                self.headers,
                error,
            ))),
        }
    }

    /// Transform the entity with a function, keeping status, headers and error.
    pub fn map_entity<F, U>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            status: self.status,
            headers: self.headers,
            body: match self.body {
                Body::Entity(entity) => Body::Entity(f(entity)),
                Body::Error(error) => Body::Error(error),
            },
        }
    }
}

fn no_entity(status: u16, error: &ErrorRecord) -> Error {
    Error::invalid_state(format!(
        "no entity was decoded for a call that failed with status {status} ({error})"
    ))
}
