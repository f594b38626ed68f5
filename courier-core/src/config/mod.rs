//! Tunable parameters for one shipping method instance.
//!
//! [`ShippingConfig`] is owned by the caller and treated as immutable for the
//! duration of a calculation. Optional bounds and caps use `None` to mean
//! "disabled"; a stored value of zero is treated the same way, matching how
//! settings pages leave a field blank.

mod schema;

use geo::Coord;

use crate::{DistanceUnit, LoadCaps};

pub use schema::{FieldRule, SETTING_RULES, SettingError, SettingField, SettingsError};

/// Travel mode requested from the distance matrix service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelMode {
    /// Road travel by car or motorbike.
    #[default]
    Driving,
    /// Pedestrian routes.
    Walking,
    /// Cycle routes.
    Bicycling,
}

impl TravelMode {
    /// Accepted option values, in display order.
    pub const OPTIONS: &'static [&'static str] = &["driving", "walking", "bicycling"];

    /// Return the value sent as the `mode` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "driving" => Ok(Self::Driving),
            "walking" => Ok(Self::Walking),
            "bicycling" => Ok(Self::Bicycling),
            _ => Err(format!("unknown travel mode '{s}'")),
        }
    }
}

/// Route feature the service should avoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteRestriction {
    /// No restriction; the `avoid` parameter is sent empty.
    #[default]
    None,
    /// Avoid toll roads.
    Tolls,
    /// Avoid highways.
    Highways,
    /// Avoid ferries.
    Ferries,
    /// Avoid indoor steps (walking and transit only).
    Indoor,
}

impl RouteRestriction {
    /// Accepted option values, in display order.
    pub const OPTIONS: &'static [&'static str] =
        &["", "none", "tolls", "highways", "ferries", "indoor"];

    /// Return the value sent as the `avoid` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Tolls => "tolls",
            Self::Highways => "highways",
            Self::Ferries => "ferries",
            Self::Indoor => "indoor",
        }
    }
}

impl std::fmt::Display for RouteRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteRestriction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "tolls" => Ok(Self::Tolls),
            "highways" => Ok(Self::Highways),
            "ferries" => Ok(Self::Ferries),
            "indoor" => Ok(Self::Indoor),
            _ => Err(format!("unknown route restriction '{s}'")),
        }
    }
}

/// Whether produced rates are subject to tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TaxStatus {
    /// Rates are taxable.
    #[default]
    Taxable,
    /// Rates carry no tax.
    None,
}

impl TaxStatus {
    /// Accepted option values, in display order.
    pub const OPTIONS: &'static [&'static str] = &["taxable", "none"];
}

impl std::str::FromStr for TaxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "taxable" => Ok(Self::Taxable),
            "none" => Ok(Self::None),
            _ => Err(format!("unknown tax status '{s}'")),
        }
    }
}

/// Configuration record for one shipping method instance.
///
/// # Examples
/// ```
/// use courier_core::ShippingConfig;
/// use geo::Coord;
///
/// let config = ShippingConfig {
///     api_key: "secret".into(),
///     origin: Some(Coord { x: 106.827, y: -6.174 }),
///     cost_per_unit: 2500.0,
///     ..ShippingConfig::default()
/// };
/// assert!(config.has_cost());
/// assert_eq!(config.origin_param().as_deref(), Some("-6.174,106.827"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShippingConfig {
    /// Title shown to the customer; the base of every rate label.
    pub title: String,
    /// Prefix of synthesised rate identifiers.
    pub method_id: String,
    /// Distance matrix API key. Empty means "not configured".
    pub api_key: String,
    /// Store location; `x` is longitude and `y` is latitude.
    pub origin: Option<Coord<f64>>,
    /// Travel mode sent to the distance service.
    pub travel_mode: TravelMode,
    /// Route feature to avoid.
    pub route_restriction: RouteRestriction,
    /// Unit used for the request and for pricing.
    pub distance_unit: DistanceUnit,
    /// Language tag sent with the request.
    pub locale: String,
    /// Price per kilometre or mile. Zero disables the method.
    pub cost_per_unit: f64,
    /// Lower bound applied to the per-driver cost.
    pub min_cost: Option<f64>,
    /// Upper bound applied to the per-driver cost.
    pub max_cost: Option<f64>,
    /// Shortest distance the method serves.
    pub min_distance: Option<f64>,
    /// Longest distance the method serves.
    pub max_distance: Option<f64>,
    /// Per-load weight cap in kilograms.
    pub max_weight: Option<f64>,
    /// Per-load width cap in centimetres.
    pub max_width: Option<f64>,
    /// Per-load length cap in centimetres.
    pub max_length: Option<f64>,
    /// Per-load height cap in centimetres.
    pub max_height: Option<f64>,
    /// Split oversize carts across several drivers instead of refusing them.
    pub allow_multiple_drivers: bool,
    /// Append the distance to the rate label.
    pub show_distance_in_label: bool,
    /// Retry once without address line 1 when the first lookup fails.
    pub enable_fallback_request: bool,
    /// Tax treatment of produced rates.
    pub tax_status: TaxStatus,
}

/// Default rate label base.
pub const DEFAULT_TITLE: &str = "Courier";

/// Default prefix for rate identifiers.
pub const DEFAULT_METHOD_ID: &str = "courier";

/// Default request language.
pub const DEFAULT_LOCALE: &str = "en";

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            method_id: DEFAULT_METHOD_ID.to_owned(),
            api_key: String::new(),
            origin: None,
            travel_mode: TravelMode::default(),
            route_restriction: RouteRestriction::default(),
            distance_unit: DistanceUnit::default(),
            locale: DEFAULT_LOCALE.to_owned(),
            cost_per_unit: 0.0,
            min_cost: None,
            max_cost: None,
            min_distance: None,
            max_distance: None,
            max_weight: None,
            max_width: None,
            max_length: None,
            max_height: None,
            allow_multiple_drivers: false,
            show_distance_in_label: false,
            enable_fallback_request: false,
            tax_status: TaxStatus::default(),
        }
    }
}

impl ShippingConfig {
    /// Preset matching a same-day motorbike courier service.
    ///
    /// Caps fit a single motorbike box; carts that do not fit are refused
    /// rather than split.
    #[must_use]
    pub fn same_day(api_key: impl Into<String>, origin: Coord<f64>) -> Self {
        Self {
            title: "Same Day".to_owned(),
            method_id: "same_day".to_owned(),
            api_key: api_key.into(),
            origin: Some(origin),
            cost_per_unit: 2500.0,
            min_cost: Some(15000.0),
            max_distance: Some(40.0),
            max_weight: Some(5.0),
            max_width: Some(25.0),
            max_length: Some(32.0),
            max_height: Some(12.0),
            ..Self::default()
        }
    }

    /// Whether a per-unit cost is configured.
    #[must_use]
    pub fn has_cost(&self) -> bool {
        self.cost_per_unit.is_finite() && self.cost_per_unit > 0.0
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Format the origin as the `lat,lng` string sent to the service.
    ///
    /// Returns `None` when no origin is configured.
    #[must_use]
    pub fn origin_param(&self) -> Option<String> {
        self.origin.map(|coord| format!("{},{}", coord.y, coord.x))
    }

    /// Per-load caps with disabled (zero) values removed.
    #[must_use]
    pub fn load_caps(&self) -> LoadCaps {
        LoadCaps {
            max_weight: active_bound(self.max_weight),
            max_width: active_bound(self.max_width),
            max_length: active_bound(self.max_length),
            max_height: active_bound(self.max_height),
        }
    }

    /// Active minimum cost bound.
    #[must_use]
    pub fn min_cost_bound(&self) -> Option<f64> {
        active_bound(self.min_cost)
    }

    /// Active maximum cost bound.
    #[must_use]
    pub fn max_cost_bound(&self) -> Option<f64> {
        active_bound(self.max_cost)
    }

    /// Active minimum distance bound.
    #[must_use]
    pub fn min_distance_bound(&self) -> Option<f64> {
        active_bound(self.min_distance)
    }

    /// Active maximum distance bound.
    #[must_use]
    pub fn max_distance_bound(&self) -> Option<f64> {
        active_bound(self.max_distance)
    }
}

/// Treat zero, negative and non-finite bounds as disabled.
fn active_bound(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
