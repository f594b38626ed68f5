//! HTTP-based `DistanceProvider` using the Distance Matrix API.
//!
//! This module provides [`HttpDistanceProvider`], an implementation of the
//! [`DistanceProvider`] trait that resolves road distances through a single
//! `GET` request per lookup.
//!
//! # Architecture
//!
//! The [`DistanceProvider`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This provider bridges the async HTTP
//! call to the sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use courier_core::{DistanceProvider, DistanceQuery};
//! use courier_data::routing::HttpDistanceProvider;
//!
//! let provider = HttpDistanceProvider::google()?;
//! let query = DistanceQuery {
//!     api_key: "secret".into(),
//!     origin: "-6.1747,106.8271".into(),
//!     destination: "Grand Indonesia,Jakarta,Indonesia".into(),
//!     travel_mode: Default::default(),
//!     restriction: Default::default(),
//!     units: Default::default(),
//!     locale: "en".into(),
//! };
//! let distance = provider.fetch(&query)?;
//! println!("{}", distance.text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use courier_core::{DistanceError, DistanceProvider, DistanceQuery, DistanceResult, DistanceUnit};
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::matrix::MatrixResponse;

/// Error type for [`HttpDistanceProvider`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// The base URL could not be parsed.
    BaseUrl(url::ParseError),
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseUrl(err) => write!(f, "invalid distance matrix URL: {err}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BaseUrl(err) => Some(err),
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Public Distance Matrix JSON endpoint.
pub const GOOGLE_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Default user agent for distance requests.
pub const DEFAULT_USER_AGENT: &str = "courier-rates/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Placeholder substituted for the API key in logged URLs and errors.
const REDACTED: &str = "REDACTED";

/// Configuration for [`HttpDistanceProvider`].
#[derive(Debug, Clone)]
pub struct HttpDistanceProviderConfig {
    /// Endpoint URL without query string.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpDistanceProviderConfig {
    fn default() -> Self {
        Self {
            base_url: GOOGLE_DISTANCE_MATRIX_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpDistanceProviderConfig {
    /// Create a new configuration with the given endpoint URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP-based distance provider for the Distance Matrix API.
///
/// The provider owns a Tokio runtime that is reused across calls. It never
/// retries: a failed attempt is reported once and the caller decides whether
/// a reduced fallback request is worth another billed call.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime, it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics. Inside a
/// `current_thread` runtime it falls back to its own runtime.
pub struct HttpDistanceProvider {
    client: Client,
    config: HttpDistanceProviderConfig,
    endpoint: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpDistanceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDistanceProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpDistanceProvider {
    /// Create a provider for the public Google endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn google() -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDistanceProviderConfig::default())
    }

    /// Create a provider for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDistanceProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: HttpDistanceProviderConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = Url::parse(&config.base_url).map_err(ProviderBuildError::BaseUrl)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoint,
            runtime,
        })
    }

    /// Build the request URL for `query`, substituting `api_key`.
    ///
    /// Parameters are sent in the order `key`, `origins`, `destinations`,
    /// `mode`, `avoid`, `units`, `language`.
    fn build_url(&self, query: &DistanceQuery, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", api_key)
            .append_pair("origins", &query.origin)
            .append_pair("destinations", &query.destination)
            .append_pair("mode", query.travel_mode.as_str())
            .append_pair("avoid", query.restriction.as_str())
            .append_pair("units", query.units.as_str())
            .append_pair("language", &query.locale);
        url
    }

    /// Fetch and decode the distance asynchronously.
    async fn fetch_async(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
        let url = self.build_url(query, &query.api_key);
        let redacted = self.build_url(query, REDACTED).to_string();
        log::debug!("requesting distance matrix: {redacted}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &redacted))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &redacted))?;

        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &redacted))?;

        Self::convert_response(&body, query.units)
    }

    /// Convert a reqwest error to a `DistanceError`.
    ///
    /// Error text from reqwest embeds the request URL, so the key is scrubbed
    /// from it as well.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> DistanceError {
        if error.is_timeout() {
            return DistanceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        let status = error.status();
        let message = error.without_url().to_string();
        if let Some(status) = status {
            return DistanceError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message,
            };
        }

        DistanceError::Network {
            url: url.to_owned(),
            message,
        }
    }

    /// Decode a response body into a distance in `units`.
    fn convert_response(body: &str, units: DistanceUnit) -> Result<DistanceResult, DistanceError> {
        let envelope: MatrixResponse =
            serde_json::from_str(body).map_err(|err| DistanceError::Parse {
                message: err.to_string(),
            })?;
        let meters = envelope.first_route_meters()?;
        Ok(DistanceResult::from_meters(meters, units, body))
    }
}

impl DistanceProvider for HttpDistanceProvider {
    /// Fetch the distance for `query`.
    ///
    /// Queries without an API key or with an empty origin or destination
    /// fail before any network access.
    fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
        query.validate()?;

        let future = self.fetch_async(query);
        let result = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        };
        if let Err(err) = &result {
            log::warn!("distance lookup failed: {err}");
        }
        result
    }
}
