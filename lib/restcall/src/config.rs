//! Client configuration types.

use std::time::Duration;

use restcall_core::ErrorHandlingBehavior;

/// Default cap on a buffered response body: 2 MiB.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024;

/// Configuration for [`RestClient`](crate::RestClient) and its transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for a whole call, body included.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum accepted response body size, in bytes.
    pub max_response_size: usize,
    /// Behavior for calls that do not pick one.
    pub default_behavior: ErrorHandlingBehavior,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            default_behavior: ErrorHandlingBehavior::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_response_size: Option<usize>,
    default_behavior: Option<ErrorHandlingBehavior>,
}

impl ClientConfigBuilder {
    /// Set the call timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum response body size.
    #[must_use]
    pub const fn max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = Some(bytes);
        self
    }

    /// Set the behavior used when a call does not pick one.
    #[must_use]
    pub const fn default_behavior(mut self, behavior: ErrorHandlingBehavior) -> Self {
        self.default_behavior = Some(behavior);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            max_response_size: self
                .max_response_size
                .unwrap_or(defaults.max_response_size),
            default_behavior: ErrorHandlingBehavior::resolve(self.default_behavior),
        }
    }
}
