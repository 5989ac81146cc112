//! Transport seam.
//!
//! [`Transport`] is the only thing the response pipeline needs from the
//! network: send a request, hand back the status, headers and payload of the
//! completed call. Implement it to plug in another HTTP stack or an in-memory
//! double for tests.

use std::future::Future;

use crate::{RawResponse, Request, Result};

/// Executes requests and returns the raw completed call.
///
/// A non-2xx status is a completed call, not an error: implementations must
/// return it as a [`RawResponse`] and leave classification to the caller.
///
/// # Example
///
/// ```ignore
/// use restcall_core::{RawResponse, Request, Result, Transport};
///
/// struct Canned(RawResponse);
///
/// impl Transport for Canned {
///     fn execute(&self, _request: Request) -> impl Future<Output = Result<RawResponse>> + Send {
///         let response = self.0.clone();
///         async move { Ok(response) }
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Execute a request.
    ///
    /// # Errors
    ///
    /// Returns a transport failure if the call never completed:
    /// - connection errors
    /// - TLS errors
    /// - timeouts
    /// - oversized responses
    fn execute(&self, request: Request) -> impl Future<Output = Result<RawResponse>> + Send;
}
