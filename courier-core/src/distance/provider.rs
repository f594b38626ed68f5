//! Distance lookup request, result and provider trait.

use crate::{DistanceUnit, RouteRestriction, ShippingConfig, TravelMode};

use super::error::DistanceError;

/// Every parameter that influences a distance matrix response.
///
/// Two queries that compare equal must yield the same response, which makes
/// the query the natural cache key source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistanceQuery {
    /// Service API key.
    pub api_key: String,
    /// Origin as sent, usually `lat,lng`.
    pub origin: String,
    /// Destination as sent, comma-joined address components.
    pub destination: String,
    /// Travel mode.
    pub travel_mode: TravelMode,
    /// Route feature to avoid.
    pub restriction: RouteRestriction,
    /// Unit system for the response.
    pub units: DistanceUnit,
    /// Response language.
    pub locale: String,
}

impl DistanceQuery {
    /// Build a query from `config` for the given origin and destination.
    #[must_use]
    pub fn from_config(
        config: &ShippingConfig,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            api_key: config.api_key.trim().to_owned(),
            origin: origin.into(),
            destination: destination.into(),
            travel_mode: config.travel_mode,
            restriction: config.route_restriction,
            units: config.distance_unit,
            locale: config.locale.clone(),
        }
    }

    /// Reject queries that cannot be sent.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::MissingApiKey`],
    /// [`DistanceError::EmptyOrigin`] or [`DistanceError::EmptyDestination`].
    pub fn validate(&self) -> Result<(), DistanceError> {
        if self.api_key.trim().is_empty() {
            return Err(DistanceError::MissingApiKey);
        }
        if self.origin.trim().is_empty() {
            return Err(DistanceError::EmptyOrigin);
        }
        if self.destination.trim().is_empty() {
            return Err(DistanceError::EmptyDestination);
        }
        Ok(())
    }
}

/// A resolved travel distance.
///
/// # Examples
/// ```
/// use courier_core::{DistanceResult, DistanceUnit};
///
/// let result = DistanceResult::from_meters(12_345.0, DistanceUnit::Metric, "{}");
/// assert_eq!(result.text, "12.35 km");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceResult {
    /// Distance in `unit`.
    pub value: f64,
    /// Unit of `value`.
    pub unit: DistanceUnit,
    /// Display text such as `12 km`.
    pub text: String,
    /// Distance in metres as reported by the service.
    pub meters: f64,
    /// Raw response body, kept for diagnostics.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw_response: String,
}

impl DistanceResult {
    /// Convert a metre distance into `unit` and render its label.
    #[must_use]
    pub fn from_meters(meters: f64, unit: DistanceUnit, raw_response: impl Into<String>) -> Self {
        let value = unit.convert_meters(meters);
        Self {
            value,
            unit,
            text: unit.format(value),
            meters,
            raw_response: raw_response.into(),
        }
    }
}

/// Resolve the travel distance for a [`DistanceQuery`].
///
/// Implementations perform no retries; the rate calculator owns the single
/// fallback attempt.
///
/// # Examples
///
/// ```
/// use courier_core::{DistanceError, DistanceProvider, DistanceQuery, DistanceResult};
///
/// struct FixedProvider;
///
/// impl DistanceProvider for FixedProvider {
///     fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
///         query.validate()?;
///         Ok(DistanceResult::from_meters(5_000.0, query.units, ""))
///     }
/// }
///
/// let query = DistanceQuery {
///     api_key: "key".into(),
///     origin: "-6.1,106.8".into(),
///     destination: "Jakarta".into(),
///     travel_mode: Default::default(),
///     restriction: Default::default(),
///     units: Default::default(),
///     locale: "en".into(),
/// };
/// assert_eq!(FixedProvider.fetch(&query)?.value, 5.0);
/// # Ok::<(), DistanceError>(())
/// ```
pub trait DistanceProvider {
    /// Return the distance between the query's origin and destination.
    ///
    /// Implementations must call [`DistanceQuery::validate`] before any
    /// network access.
    fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError>;
}

impl<P: DistanceProvider + ?Sized> DistanceProvider for &P {
    fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
        (**self).fetch(query)
    }
}

impl<P: DistanceProvider + ?Sized> DistanceProvider for Box<P> {
    fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
        (**self).fetch(query)
    }
}
