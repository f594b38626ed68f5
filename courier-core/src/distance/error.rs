use thiserror::Error;

/// Errors from [`crate::distance::DistanceProvider::fetch`].
///
/// Variants split into configuration problems, which no retry can fix, and
/// lookup failures, which the rate calculator may retry once with a reduced
/// destination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum DistanceError {
    /// No API key is configured.
    #[error("distance matrix API key is not configured")]
    MissingApiKey,
    /// The origin produced no request component.
    #[error("store origin is not configured")]
    EmptyOrigin,
    /// The destination produced no request component.
    #[error("destination address has no usable fields")]
    EmptyDestination,
    /// The request could not be sent or the connection failed.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Redacted request URL.
        url: String,
        /// Transport error text.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Redacted request URL.
        url: String,
        /// Configured timeout in whole seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Redacted request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text.
        message: String,
    },
    /// The response body was not the expected JSON envelope.
    #[error("malformed distance matrix response: {message}")]
    Parse {
        /// Decoder error text.
        message: String,
    },
    /// The envelope carried a top-level status other than `OK`.
    #[error("distance matrix API returned {status}: {message}")]
    Api {
        /// Top-level status code, e.g. `REQUEST_DENIED`.
        status: String,
        /// Optional `error_message` from the service.
        message: String,
    },
    /// No origin/destination pairing produced a route.
    #[error("no route found{}", .status.as_deref().map(|s| format!(" ({s})")).unwrap_or_default())]
    NoRoute {
        /// Last element status seen, e.g. `ZERO_RESULTS`; `None` when the
        /// response held no elements at all.
        status: Option<String>,
    },
}

impl DistanceError {
    /// Whether the error stems from missing configuration or input rather
    /// than from the lookup itself.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey | Self::EmptyOrigin | Self::EmptyDestination
        )
    }
}
