//! Call dispatch.

use std::sync::Arc;
use std::time::Instant;

use restcall_core::{
    BatchCreateDecoder, BatchCreateResult, DefaultErrorDecoder, EntityDecoder, Error, ErrorDecoder,
    ErrorHandlingBehavior, JsonDecoder, Method, Request, Response, Result, Transport,
    decode_response,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Instrument, Level, debug, info, span, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::transport::HyperTransport;

/// RPC client dispatching calls and interpreting their responses.
///
/// Each call runs under one [`ErrorHandlingBehavior`]: the one passed to
/// [`send_with`](Self::send_with), or the client's default for
/// [`send`](Self::send). Calls share no mutable state, so a client can be
/// used from many tasks at once.
///
/// # Example
///
/// ```ignore
/// use restcall::prelude::*;
///
/// let client = RestClient::new();
/// let request = Request::builder(Method::GET, "https://api.example.com/greetings/1".parse()?).build();
///
/// // Raises `Error::Service` on a non-2xx status
/// let greeting = client.send(request.clone(), &JsonDecoder::<Greeting>::new()).await?;
///
/// // Hands the decoded error back inside the response
/// let response = client
///     .send_with(request, &JsonDecoder::<Greeting>::new(), ErrorHandlingBehavior::TreatServerErrorAsSuccess)
///     .await?;
/// if let Some(error) = response.error() {
///     eprintln!("{}: {}", error.status(), error.message());
/// }
/// ```
#[derive(Clone)]
pub struct RestClient<T = HyperTransport> {
    transport: T,
    errors: Arc<dyn ErrorDecoder>,
    default_behavior: ErrorHandlingBehavior,
}

impl<T: std::fmt::Debug> std::fmt::Debug for RestClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("transport", &self.transport)
            .field("default_behavior", &self.default_behavior)
            .finish_non_exhaustive()
    }
}

impl RestClient<HyperTransport> {
    /// Create a client over the default transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client over the default transport.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let default_behavior = config.default_behavior;
        Self::with_transport(HyperTransport::with_config(config))
            .with_default_behavior(default_behavior)
    }
}

impl Default for RestClient<HyperTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> RestClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            errors: Arc::new(DefaultErrorDecoder),
            default_behavior: ErrorHandlingBehavior::default(),
        }
    }

    /// Replace the error payload decoder.
    #[must_use]
    pub fn with_error_decoder(mut self, decoder: impl ErrorDecoder) -> Self {
        self.errors = Arc::new(decoder);
        self
    }

    /// Set the behavior used by [`send`](Self::send).
    #[must_use]
    pub fn with_default_behavior(mut self, behavior: ErrorHandlingBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The behavior used by [`send`](Self::send).
    #[must_use]
    pub const fn default_behavior(&self) -> ErrorHandlingBehavior {
        self.default_behavior
    }

    /// Execute a call under the client's default behavior.
    ///
    /// # Errors
    ///
    /// Returns a transport failure if the call never completed, a decode
    /// failure if a payload is malformed, and [`Error::Service`] for a non-2xx
    /// status when the default behavior is
    /// [`ErrorHandlingBehavior::FailOnError`].
    pub async fn send<D>(&self, request: Request, decoder: &D) -> Result<Response<D::Entity>>
    where
        D: EntityDecoder + ?Sized,
    {
        self.dispatch(request, decoder, self.default_behavior).await
    }

    /// Execute a call under an explicit behavior.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send); protocol errors are only raised under
    /// [`ErrorHandlingBehavior::FailOnError`].
    pub async fn send_with<D>(
        &self,
        request: Request,
        decoder: &D,
        behavior: ErrorHandlingBehavior,
    ) -> Result<Response<D::Entity>>
    where
        D: EntityDecoder + ?Sized,
    {
        self.dispatch(request, decoder, behavior).await
    }

    /// Execute a call whose success body is a JSON entity.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn fetch<E>(&self, request: Request) -> Result<Response<E>>
    where
        E: DeserializeOwned + Send,
    {
        self.send(request, &JsonDecoder::<E>::new()).await
    }

    /// Create several entities in one call.
    ///
    /// The items are posted as a JSON array. The call's own outcome follows
    /// `behavior`; per-item failures are always reported inside the
    /// [`BatchCreateResult`], in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonSerialization`] if the items cannot be encoded,
    /// otherwise see [`send_with`](Self::send_with).
    pub async fn batch_create<K, I>(
        &self,
        url: Url,
        items: &[I],
        behavior: ErrorHandlingBehavior,
    ) -> Result<Response<BatchCreateResult<K>>>
    where
        K: DeserializeOwned + Send,
        I: Serialize,
    {
        let request = Request::builder(Method::POST, url)
            .header("X-RestLi-Method", "BATCH_CREATE")
            .json(&items)?
            .build();
        let decoder = BatchCreateDecoder::<K>::for_items(items);
        self.send_with(request, &decoder, behavior).await
    }

    async fn dispatch<D>(
        &self,
        request: Request,
        decoder: &D,
        behavior: ErrorHandlingBehavior,
    ) -> Result<Response<D::Entity>>
    where
        D: EntityDecoder + ?Sized,
    {
        let method = request.method().clone();
        let url = request.url().to_string();
        let span = span!(Level::INFO, "rest_call", %method, %url);

        async move {
            let start = Instant::now();
            debug!(%behavior, headers = ?request.headers(), "sending request");

            let result = self.transport.execute(request).await;
            // Saturating conversion to u64
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            let raw = match result {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(error = %err, elapsed_ms, "call failed before completing");
                    return Err(err);
                }
            };

            let status = raw.status();
            info!(status, elapsed_ms, "call completed");

            let outcome = decode_response(raw, decoder, self.errors.as_ref(), behavior);
            match &outcome {
                Ok(response) => {
                    if let Some(error) = response.error() {
                        warn!(
                            status,
                            service_error_code = error.service_error_code(),
                            %behavior,
                            "call returned an error"
                        );
                    }
                }
                Err(Error::Service(raised)) => {
                    warn!(
                        status,
                        service_error_code = raised.record().service_error_code(),
                        %behavior,
                        "call returned an error"
                    );
                }
                Err(err) => {
                    warn!(status, error = %err, "response could not be decoded");
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }
}
