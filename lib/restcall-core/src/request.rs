//! Request carrier handed to a [`Transport`](crate::Transport).
//!
//! Building URLs and request bodies belongs to the caller (usually generated
//! request builders); this type only carries the result to the transport.
//!
//! # Example
//!
//! ```
//! use restcall_core::{Method, Request};
//!
//! let request = Request::builder(Method::GET, "https://api.example.com/greetings/1".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .build();
//! assert_eq!(request.method(), &Method::GET);
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use http::Method;
use url::Url;

/// An outgoing call: method, URL, headers and optional body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::raw_response::header_ignore_case(&self.headers, name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, HashMap<String, String>, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self.header("Content-Type", "application/json").body(body))
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://api.example.com{path}")).expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let request = Request::builder(Method::GET, url("/greetings/1"))
            .header("Accept", "application/json")
            .build();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().as_str(), "https://api.example.com/greetings/1");
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn request_builder_json() {
        #[derive(serde::Serialize)]
        struct Greeting {
            message: String,
        }

        let request = Request::builder(Method::POST, url("/greetings"))
            .json(&Greeting {
                message: "Hello".to_string(),
            })
            .expect("json")
            .build();

        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.body().map(Bytes::as_ref),
            Some(br#"{"message":"Hello"}"#.as_slice())
        );
    }

    #[test]
    fn request_into_parts() {
        let request = Request::builder(Method::DELETE, url("/greetings/3"))
            .body("x")
            .build();
        let (method, url, headers, body) = request.into_parts();

        assert_eq!(method, Method::DELETE);
        assert_eq!(url.path(), "/greetings/3");
        assert!(headers.is_empty());
        assert_eq!(body, Some(Bytes::from_static(b"x")));
    }
}
