//! Default transport using hyper-util.

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use restcall_core::{Error, RawResponse, Request, Result, Transport};
use tracing::trace;

use crate::config::ClientConfig;
use crate::connector::https_connector;

/// HTTP transport using hyper-util with connection pooling and TLS.
///
/// Buffers the whole body of every response, up to
/// [`ClientConfig::max_response_size`]. The call timeout covers the body read.
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let connector = https_connector(&config);
        let inner = Client::builder(TokioExecutor::new()).build(connector);
        Self { inner, config }
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder().method(method).uri(url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn round_trip(&self, request: http::Request<Full<Bytes>>) -> Result<RawResponse> {
        let response = self
            .inner
            .request(request)
            .await
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        let max = self.config.max_response_size;
        let declared = headers
            .get(http::header::CONTENT_LENGTH.as_str())
            .and_then(|len| len.parse::<usize>().ok());
        if let Some(size) = declared.filter(|size| *size > max) {
            return Err(Error::ResponseTooLarge { size, max });
        }

        // Read frame by frame, failing as soon as the body grows past `max`.
        let mut body = response.into_body();
        let mut buffer = BytesMut::new();
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(|e| Error::connection(e.to_string()))?;
            if let Ok(data) = frame.into_data() {
                let size = buffer.len() + data.len();
                if size > max {
                    return Err(Error::ResponseTooLarge { size, max });
                }
                buffer.extend_from_slice(&data);
            }
        }
        let body = buffer.freeze();
        trace!(status, bytes = body.len(), "response received");

        Ok(RawResponse::new(status, headers, body))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    async fn execute(&self, request: Request) -> Result<RawResponse> {
        let hyper_request = Self::build_hyper_request(request)?;

        tokio::time::timeout(self.config.timeout, self.round_trip(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use restcall_core::Method;

    use super::*;

    #[test]
    fn builds_hyper_request() {
        let request = Request::builder(
            Method::POST,
            "http://localhost/greetings".parse().expect("url"),
        )
        .header("X-RestLi-Method", "BATCH_CREATE")
        .body("[]")
        .build();

        let hyper_request = HyperTransport::build_hyper_request(request).expect("request");
        assert_eq!(hyper_request.method(), http::Method::POST);
        assert_eq!(hyper_request.uri(), "http://localhost/greetings");
        assert_eq!(
            hyper_request
                .headers()
                .get("x-restli-method")
                .and_then(|v| v.to_str().ok()),
            Some("BATCH_CREATE")
        );
    }

    #[test]
    fn rejects_invalid_header_name() {
        let request = Request::builder(Method::GET, "http://localhost/".parse().expect("url"))
            .header("bad header", "value")
            .build();

        let result = HyperTransport::build_hyper_request(request);
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn extracts_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-restli-id", http::HeaderValue::from_static("10"));

        let extracted = HyperTransport::extract_headers(&headers);
        assert_eq!(extracted.get("x-restli-id").map(String::as_str), Some("10"));
    }
}
