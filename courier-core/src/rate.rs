//! Turn a cart and destination into a priced shipping rate.
//!
//! [`RateCalculator::compute`] runs the whole pipeline: format the
//! destination, look up the distance (retrying once without the first street
//! line when allowed), enforce distance bounds, split the cart into driver
//! loads and price the result. Every lower-level error is folded into a
//! [`RateOutcome`]; nothing escapes as a `Result`.

use crate::{
    Address, AddressField, AddressFormatter, CartItem, DistanceError, DistanceProvider,
    DistanceQuery, DistanceResult, FormatMode, LoadPartitioner, PartitionError, RegionLookup,
    ShippingConfig, TaxStatus,
};

/// A rate offered to the customer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RateDescriptor {
    /// Identifier embedding the driver count, e.g. `courier_2`.
    pub id: String,
    /// Customer-facing label.
    pub label: String,
    /// Total cost across all drivers.
    pub cost: f64,
    /// Number of driver loads; at least one.
    pub driver_count: u32,
    /// Distance the price was derived from.
    pub distance: Option<DistanceResult>,
    /// Whether the rate is subject to tax.
    pub taxable: bool,
}

/// Why no rate was produced although nothing went wrong.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "reason", rename_all = "snake_case"))]
pub enum SkipReason {
    /// Cost per unit is zero or unset.
    NoCostConfigured,
    /// The cart holds no items.
    EmptyCart,
    /// No store origin is configured.
    OriginUnavailable,
    /// The destination has no usable fields for this request.
    DestinationUnformattable,
    /// Every distance lookup failed.
    DistanceUnavailable {
        /// The last lookup error.
        error: DistanceError,
    },
    /// The distance lies outside the served range.
    DistanceOutOfRange {
        /// Resolved distance in the configured unit.
        distance: f64,
        /// Active lower bound.
        min: Option<f64>,
        /// Active upper bound.
        max: Option<f64>,
    },
}

/// Result of one rate calculation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "outcome", content = "detail", rename_all = "snake_case")
)]
pub enum RateOutcome {
    /// A priced rate.
    Rate(RateDescriptor),
    /// The method does not apply to this request.
    Skip(SkipReason),
    /// The cart cannot be carried under the configured caps.
    Reject(PartitionError),
    /// Configuration prevents deciding between a rate and a skip.
    Failure(DistanceError),
}

impl RateOutcome {
    /// The produced rate, if any.
    #[must_use]
    pub const fn rate(&self) -> Option<&RateDescriptor> {
        match self {
            Self::Rate(rate) => Some(rate),
            _ => None,
        }
    }

    /// Whether the shipping option should be offered.
    #[must_use]
    pub const fn is_rate(&self) -> bool {
        matches!(self, Self::Rate(_))
    }
}

/// Orchestrates formatting, distance lookup, partitioning and pricing.
///
/// # Examples
/// ```
/// use courier_core::{
///     Address, CartItem, DistanceError, DistanceProvider, DistanceQuery, DistanceResult,
///     FormatMode, NoRegionLookup, RateCalculator, ShippingConfig,
/// };
/// use geo::Coord;
///
/// struct TenKm;
///
/// impl DistanceProvider for TenKm {
///     fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
///         query.validate()?;
///         Ok(DistanceResult::from_meters(10_000.0, query.units, ""))
///     }
/// }
///
/// let config = ShippingConfig::same_day("key", Coord { x: 106.8, y: -6.1 });
/// let destination = Address { city: Some("Jakarta".into()), ..Address::default() };
/// let outcome = RateCalculator::new(TenKm, NoRegionLookup).compute(
///     &config,
///     &[CartItem::new(1.0, 10.0, 10.0, 5.0)],
///     &destination,
///     FormatMode::Checkout,
/// );
/// let rate = outcome.rate().expect("rate");
/// assert_eq!(rate.cost, 25_000.0);
/// assert_eq!(rate.label, "Same Day");
/// ```
#[derive(Debug)]
pub struct RateCalculator<P, L> {
    provider: P,
    lookup: L,
}

impl<P: DistanceProvider, L: RegionLookup> RateCalculator<P, L> {
    /// Create a calculator using `provider` for distances and `lookup` for
    /// region names.
    #[must_use]
    pub const fn new(provider: P, lookup: L) -> Self {
        Self { provider, lookup }
    }

    /// The distance provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether the method can be offered at all for this cart and
    /// destination, before any lookup.
    #[must_use]
    pub fn is_available(&self, cart: &[CartItem], destination: &Address) -> bool {
        !cart.is_empty()
            && !AddressFormatter::new(&self.lookup)
                .format(destination, FormatMode::Checkout)
                .is_empty()
    }

    /// Price `cart` for delivery to `destination` under `config`.
    #[must_use]
    pub fn compute(
        &self,
        config: &ShippingConfig,
        cart: &[CartItem],
        destination: &Address,
        mode: FormatMode,
    ) -> RateOutcome {
        if !config.has_cost() {
            return RateOutcome::Skip(SkipReason::NoCostConfigured);
        }
        if !config.has_api_key() {
            return RateOutcome::Failure(DistanceError::MissingApiKey);
        }
        if cart.is_empty() {
            return RateOutcome::Skip(SkipReason::EmptyCart);
        }
        let Some(origin) = config.origin_param() else {
            return RateOutcome::Skip(SkipReason::OriginUnavailable);
        };
        let formatted = AddressFormatter::new(&self.lookup).format(destination, mode);
        if formatted.is_empty() {
            return RateOutcome::Skip(SkipReason::DestinationUnformattable);
        }

        let first = DistanceQuery::from_config(config, origin.as_str(), formatted.to_param());
        let lookup = self.provider.fetch(&first).or_else(|error| {
            let retry = config.enable_fallback_request
                && !error.is_configuration()
                && formatted.contains(AddressField::AddressLine1)
                && formatted.contains(AddressField::AddressLine2);
            if !retry {
                return Err(error);
            }
            log::warn!("distance lookup failed ({error}); retrying without address line 1");
            let reduced = formatted.without(AddressField::AddressLine1);
            let fallback = DistanceQuery::from_config(config, origin.as_str(), reduced.to_param());
            self.provider.fetch(&fallback)
        });
        let distance = match lookup {
            Ok(distance) => distance,
            Err(error) if error.is_configuration() => return RateOutcome::Failure(error),
            Err(error) => {
                log::warn!("distance lookup failed: {error}");
                return RateOutcome::Skip(SkipReason::DistanceUnavailable { error });
            }
        };

        let min = config.min_distance_bound();
        let max = config.max_distance_bound();
        if min.is_some_and(|m| distance.value < m) || max.is_some_and(|m| distance.value > m) {
            log::debug!("distance {} outside served range", distance.text);
            return RateOutcome::Skip(SkipReason::DistanceOutOfRange {
                distance: distance.value,
                min,
                max,
            });
        }

        let plan = match LoadPartitioner::new(config.load_caps(), config.allow_multiple_drivers)
            .partition(cart)
        {
            Ok(plan) => plan,
            Err(error) => {
                log::debug!("cart rejected: {error}");
                return RateOutcome::Reject(error);
            }
        };
        let driver_count = plan.driver_count();

        let rate = RateDescriptor {
            id: rate_id(&config.method_id, driver_count),
            label: rate_label(config, driver_count, &distance.text),
            cost: rate_cost(config, distance.value, driver_count),
            driver_count,
            distance: Some(distance),
            taxable: config.tax_status == TaxStatus::Taxable,
        };
        log::info!("{} priced at {} for {} driver(s)", rate.id, rate.cost, driver_count);
        RateOutcome::Rate(rate)
    }
}

/// Identifier for a rate carried by `driver_count` drivers.
#[must_use]
pub fn rate_id(method_id: &str, driver_count: u32) -> String {
    format!("{method_id}_{driver_count}")
}

/// Total cost for `distance` in the configured unit.
///
/// The per-driver cost is floored at the minimum, then capped at the
/// maximum, then multiplied by the driver count.
///
/// # Examples
/// ```
/// use courier_core::{ShippingConfig, rate_cost};
///
/// let config = ShippingConfig {
///     cost_per_unit: 1_000.0,
///     min_cost: Some(5_000.0),
///     ..ShippingConfig::default()
/// };
/// assert_eq!(rate_cost(&config, 2.0, 1), 5_000.0);
/// assert_eq!(rate_cost(&config, 8.0, 2), 16_000.0);
/// ```
#[must_use]
pub fn rate_cost(config: &ShippingConfig, distance: f64, driver_count: u32) -> f64 {
    let mut per_driver = config.cost_per_unit * distance;
    if let Some(min) = config.min_cost_bound() {
        per_driver = per_driver.max(min);
    }
    if let Some(max) = config.max_cost_bound() {
        per_driver = per_driver.min(max);
    }
    per_driver * f64::from(driver_count.max(1))
}

/// Customer-facing label for a rate.
#[must_use]
pub fn rate_label(config: &ShippingConfig, driver_count: u32, distance_text: &str) -> String {
    let title = config.title.as_str();
    let drivers = (driver_count > 1).then(|| format!("{driver_count} drivers"));
    match (config.show_distance_in_label, drivers) {
        (true, Some(drivers)) => format!("{title} ({drivers}, {distance_text})"),
        (true, None) => format!("{title} ({distance_text})"),
        (false, Some(drivers)) => format!("{title} ({drivers})"),
        (false, None) => title.to_owned(),
    }
}
