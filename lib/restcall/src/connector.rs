//! Connector used by [`HyperTransport`](crate::HyperTransport).
//!
//! Rest.li services are reached over plain `http` as often as over `https`,
//! so both schemes are accepted.

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;

use crate::config::ClientConfig;

/// Create the connector for a [`ClientConfig`].
///
/// TLS uses rustls with the Mozilla root certificates. HTTP/1.1 and HTTP/2
/// are negotiated, and [`ClientConfig::connect_timeout`] bounds each
/// connection attempt separately from the call timeout.
#[must_use]
pub fn https_connector(config: &ClientConfig) -> HttpsConnector<HttpConnector> {
    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(config.connect_timeout));

    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http)
}
