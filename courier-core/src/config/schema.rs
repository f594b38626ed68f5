//! Validation of stored settings into a [`ShippingConfig`].
//!
//! Settings pages persist every field as a string. Each stored field is a
//! [`SettingField`] variant, and [`SETTING_RULES`] maps it to the single
//! [`FieldRule`] that validates it. [`ShippingConfig::from_settings`] walks the
//! table once, collecting every failure instead of stopping at the first.

use std::collections::BTreeMap;
use std::str::FromStr;

use geo::Coord;
use thiserror::Error;

use super::{RouteRestriction, ShippingConfig, TaxStatus, TravelMode};
use crate::DistanceUnit;

/// One stored setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    /// Rate label base.
    Title,
    /// Distance matrix API key.
    ApiKey,
    /// Store latitude.
    OriginLat,
    /// Store longitude.
    OriginLng,
    /// Travel mode.
    TravelMode,
    /// Route restriction.
    RouteRestriction,
    /// Distance unit system.
    DistanceUnits,
    /// Request language.
    Locale,
    /// Tax treatment.
    TaxStatus,
    /// Price per distance unit.
    CostPerUnit,
    /// Minimum cost.
    MinCost,
    /// Maximum cost.
    MaxCost,
    /// Minimum distance.
    MinDistance,
    /// Maximum distance.
    MaxDistance,
    /// Per-load weight cap.
    MaxWeight,
    /// Per-load width cap.
    MaxWidth,
    /// Per-load length cap.
    MaxLength,
    /// Per-load height cap.
    MaxHeight,
    /// Allow splitting across drivers.
    MultipleDrivers,
    /// Show the distance in the label.
    ShowDistance,
    /// Retry without address line 1.
    FallbackRequest,
}

impl SettingField {
    /// Key under which the field is stored.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::ApiKey => "api_key",
            Self::OriginLat => "origin_lat",
            Self::OriginLng => "origin_lng",
            Self::TravelMode => "travel_mode",
            Self::RouteRestriction => "route_restrictions",
            Self::DistanceUnits => "distance_unit",
            Self::Locale => "locale",
            Self::TaxStatus => "tax_status",
            Self::CostPerUnit => "cost_per_unit",
            Self::MinCost => "min_cost",
            Self::MaxCost => "max_cost",
            Self::MinDistance => "min_distance",
            Self::MaxDistance => "max_distance",
            Self::MaxWeight => "max_weight",
            Self::MaxWidth => "max_width",
            Self::MaxLength => "max_length",
            Self::MaxHeight => "max_height",
            Self::MultipleDrivers => "multiple_drivers",
            Self::ShowDistance => "show_distance",
            Self::FallbackRequest => "enable_fallback_request",
        }
    }
}

/// Validation rule attached to a [`SettingField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Free text; `required` rejects blank values.
    Text {
        /// Whether a blank value is an error.
        required: bool,
    },
    /// Latitude in `[-90, 90]`; blank leaves the origin unset.
    Latitude,
    /// Longitude in `[-180, 180]`; blank leaves the origin unset.
    Longitude,
    /// One of a fixed set of lowercase options.
    Choice(&'static [&'static str]),
    /// Optional non-negative number; blank leaves the field unset.
    Decimal,
    /// Boolean flag stored as `yes`/`no`.
    Flag,
}

/// Rule table consulted by [`ShippingConfig::from_settings`].
pub const SETTING_RULES: &[(SettingField, FieldRule)] = &[
    (SettingField::Title, FieldRule::Text { required: false }),
    (SettingField::ApiKey, FieldRule::Text { required: true }),
    (SettingField::OriginLat, FieldRule::Latitude),
    (SettingField::OriginLng, FieldRule::Longitude),
    (SettingField::TravelMode, FieldRule::Choice(TravelMode::OPTIONS)),
    (
        SettingField::RouteRestriction,
        FieldRule::Choice(RouteRestriction::OPTIONS),
    ),
    (SettingField::DistanceUnits, FieldRule::Choice(&["metric", "imperial"])),
    (SettingField::Locale, FieldRule::Text { required: false }),
    (SettingField::TaxStatus, FieldRule::Choice(TaxStatus::OPTIONS)),
    (SettingField::CostPerUnit, FieldRule::Decimal),
    (SettingField::MinCost, FieldRule::Decimal),
    (SettingField::MaxCost, FieldRule::Decimal),
    (SettingField::MinDistance, FieldRule::Decimal),
    (SettingField::MaxDistance, FieldRule::Decimal),
    (SettingField::MaxWeight, FieldRule::Decimal),
    (SettingField::MaxWidth, FieldRule::Decimal),
    (SettingField::MaxLength, FieldRule::Decimal),
    (SettingField::MaxHeight, FieldRule::Decimal),
    (SettingField::MultipleDrivers, FieldRule::Flag),
    (SettingField::ShowDistance, FieldRule::Flag),
    (SettingField::FallbackRequest, FieldRule::Flag),
];

/// A single invalid setting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    /// A required field was blank or missing.
    #[error("{field} is required")]
    Required {
        /// Storage key of the field.
        field: &'static str,
    },
    /// The value could not be parsed as a number.
    #[error("{field} value {value:?} must be numeric")]
    NotNumeric {
        /// Storage key of the field.
        field: &'static str,
        /// Raw value.
        value: String,
    },
    /// The value was numeric but outside the accepted range.
    #[error("{field} value {value} must be between {min} and {max}")]
    OutOfRange {
        /// Storage key of the field.
        field: &'static str,
        /// Parsed value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// The value is not one of the allowed options.
    #[error("{field} value {value:?} is not an available option")]
    UnknownOption {
        /// Storage key of the field.
        field: &'static str,
        /// Raw value.
        value: String,
    },
}

/// All invalid settings found in one pass.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} invalid setting(s): {}", errors.len(), summary(errors))]
pub struct SettingsError {
    /// Every failing field, in table order.
    pub errors: Vec<SettingError>,
}

fn summary(errors: &[SettingError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Value produced by a successful rule check.
#[derive(Debug, Clone, PartialEq)]
enum SettingValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl FieldRule {
    /// Check `raw` against this rule.
    ///
    /// Blank optional values yield `Ok(None)`.
    fn check(
        self,
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<Option<SettingValue>, SettingError> {
        let value = raw.map(str::trim).filter(|v| !v.is_empty());
        match (self, value) {
            (Self::Text { required: true }, None) => Err(SettingError::Required { field }),
            (_, None) => Ok(None),
            (Self::Text { .. }, Some(text)) => Ok(Some(SettingValue::Text(text.to_owned()))),
            (Self::Latitude, Some(text)) => ranged(field, text, -90.0, 90.0).map(Some),
            (Self::Longitude, Some(text)) => ranged(field, text, -180.0, 180.0).map(Some),
            (Self::Decimal, Some(text)) => ranged(field, text, 0.0, f64::MAX).map(Some),
            (Self::Choice(options), Some(text)) => {
                let lowered = text.to_lowercase();
                if options.contains(&lowered.as_str()) {
                    Ok(Some(SettingValue::Text(lowered)))
                } else {
                    Err(SettingError::UnknownOption {
                        field,
                        value: text.to_owned(),
                    })
                }
            }
            (Self::Flag, Some(text)) => match text.to_lowercase().as_str() {
                "yes" | "true" | "1" | "on" => Ok(Some(SettingValue::Flag(true))),
                "no" | "false" | "0" | "off" => Ok(Some(SettingValue::Flag(false))),
                _ => Err(SettingError::UnknownOption {
                    field,
                    value: text.to_owned(),
                }),
            },
        }
    }
}

fn ranged(
    field: &'static str,
    text: &str,
    min: f64,
    max: f64,
) -> Result<SettingValue, SettingError> {
    let value = text
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SettingError::NotNumeric {
            field,
            value: text.to_owned(),
        })?;
    if (min..=max).contains(&value) {
        Ok(SettingValue::Number(value))
    } else {
        Err(SettingError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl ShippingConfig {
    /// Validate stored string settings and build a configuration.
    ///
    /// Missing optional fields keep their [`Default`] values. Unknown keys are
    /// ignored. The origin is optional, but a latitude without a longitude
    /// (or the reverse) reports the missing half as required.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] listing every field that failed its rule.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    /// use courier_core::ShippingConfig;
    ///
    /// let settings = BTreeMap::from([
    ///     ("api_key".to_owned(), "secret".to_owned()),
    ///     ("origin_lat".to_owned(), "-6.17".to_owned()),
    ///     ("origin_lng".to_owned(), "106.82".to_owned()),
    ///     ("cost_per_unit".to_owned(), "2500".to_owned()),
    ///     ("multiple_drivers".to_owned(), "yes".to_owned()),
    /// ]);
    /// let config = ShippingConfig::from_settings(&settings)?;
    /// assert!(config.allow_multiple_drivers);
    /// # Ok::<(), courier_core::SettingsError>(())
    /// ```
    pub fn from_settings(settings: &BTreeMap<String, String>) -> Result<Self, SettingsError> {
        let mut config = Self::default();
        let mut errors = Vec::new();
        let mut lat = None;
        let mut lng = None;
        let given = |field: SettingField| {
            settings
                .get(field.key())
                .is_some_and(|value| !value.trim().is_empty())
        };
        let half_origin = given(SettingField::OriginLat) != given(SettingField::OriginLng);

        for &(field, rule) in SETTING_RULES {
            let raw = settings.get(field.key()).map(String::as_str);
            match rule.check(field.key(), raw) {
                Ok(Some(SettingValue::Number(value))) if field == SettingField::OriginLat => {
                    lat = Some(value);
                }
                Ok(Some(SettingValue::Number(value))) if field == SettingField::OriginLng => {
                    lng = Some(value);
                }
                Ok(Some(value)) => config.apply(field, value),
                Ok(None)
                    if half_origin
                        && matches!(field, SettingField::OriginLat | SettingField::OriginLng) =>
                {
                    errors.push(SettingError::Required { field: field.key() });
                }
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }

        if let (Some(y), Some(x)) = (lat, lng) {
            config.origin = Some(Coord { x, y });
        }

        if errors.is_empty() {
            Ok(config)
        } else {
            Err(SettingsError { errors })
        }
    }

    fn apply(&mut self, field: SettingField, value: SettingValue) {
        match (field, value) {
            (SettingField::Title, SettingValue::Text(text)) => self.title = text,
            (SettingField::ApiKey, SettingValue::Text(text)) => self.api_key = text,
            (SettingField::Locale, SettingValue::Text(text)) => self.locale = text,
            // Choice values were checked against the option lists above.
            (SettingField::TravelMode, SettingValue::Text(text)) => {
                self.travel_mode = TravelMode::from_str(&text).unwrap_or_default();
            }
            (SettingField::RouteRestriction, SettingValue::Text(text)) => {
                self.route_restriction = RouteRestriction::from_str(&text).unwrap_or_default();
            }
            (SettingField::DistanceUnits, SettingValue::Text(text)) => {
                self.distance_unit = DistanceUnit::from_str(&text).unwrap_or_default();
            }
            (SettingField::TaxStatus, SettingValue::Text(text)) => {
                self.tax_status = TaxStatus::from_str(&text).unwrap_or_default();
            }
            (SettingField::CostPerUnit, SettingValue::Number(n)) => self.cost_per_unit = n,
            (SettingField::MinCost, SettingValue::Number(n)) => self.min_cost = Some(n),
            (SettingField::MaxCost, SettingValue::Number(n)) => self.max_cost = Some(n),
            (SettingField::MinDistance, SettingValue::Number(n)) => self.min_distance = Some(n),
            (SettingField::MaxDistance, SettingValue::Number(n)) => self.max_distance = Some(n),
            (SettingField::MaxWeight, SettingValue::Number(n)) => self.max_weight = Some(n),
            (SettingField::MaxWidth, SettingValue::Number(n)) => self.max_width = Some(n),
            (SettingField::MaxLength, SettingValue::Number(n)) => self.max_length = Some(n),
            (SettingField::MaxHeight, SettingValue::Number(n)) => self.max_height = Some(n),
            (SettingField::MultipleDrivers, SettingValue::Flag(flag)) => {
                self.allow_multiple_drivers = flag;
            }
            (SettingField::ShowDistance, SettingValue::Flag(flag)) => {
                self.show_distance_in_label = flag;
            }
            (SettingField::FallbackRequest, SettingValue::Flag(flag)) => {
                self.enable_fallback_request = flag;
            }
            (field, value) => {
                log::warn!("ignoring {value:?} for setting {}", field.key());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid_settings() -> BTreeMap<String, String> {
        [
            ("api_key", "secret"),
            ("origin_lat", "-6.17477373803497"),
            ("origin_lng", "106.82717425767213"),
            ("travel_mode", "walking"),
            ("route_restrictions", "tolls"),
            ("distance_unit", "imperial"),
            ("cost_per_unit", "2500"),
            ("min_cost", "15000"),
            ("max_cost", ""),
            ("max_weight", "5"),
            ("show_distance", "yes"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
    }

    #[rstest]
    fn builds_config_from_valid_settings(valid_settings: BTreeMap<String, String>) {
        let config = ShippingConfig::from_settings(&valid_settings).expect("valid settings");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.travel_mode, TravelMode::Walking);
        assert_eq!(config.route_restriction, RouteRestriction::Tolls);
        assert_eq!(config.distance_unit, DistanceUnit::Imperial);
        assert_eq!(config.min_cost, Some(15000.0));
        assert_eq!(config.max_cost, None);
        assert_eq!(config.max_weight, Some(5.0));
        assert!(config.show_distance_in_label);
        assert!(!config.allow_multiple_drivers);
        let origin = config.origin.expect("origin set");
        assert!((origin.y - -6.174_773_738_034_97).abs() < 1e-12);
    }

    #[rstest]
    fn reports_every_invalid_field() {
        let settings: BTreeMap<String, String> = [
            ("origin_lat", "95"),
            ("origin_lng", "abc"),
            ("travel_mode", "teleport"),
            ("min_cost", "-1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let err = ShippingConfig::from_settings(&settings).expect_err("invalid settings");

        assert_eq!(err.errors.len(), 5, "{err}");
        assert_eq!(err.errors[0], SettingError::Required { field: "api_key" });
        assert!(matches!(
            err.errors[1],
            SettingError::OutOfRange { field: "origin_lat", .. }
        ));
        assert!(matches!(
            err.errors[2],
            SettingError::NotNumeric { field: "origin_lng", .. }
        ));
        assert!(matches!(
            err.errors[3],
            SettingError::UnknownOption { field: "travel_mode", .. }
        ));
        assert!(matches!(
            err.errors[4],
            SettingError::OutOfRange { field: "min_cost", .. }
        ));
    }

    #[rstest]
    fn origin_is_optional() {
        let settings = BTreeMap::from([
            ("api_key".to_owned(), "k".to_owned()),
            ("cost_per_unit".to_owned(), "2500".to_owned()),
        ]);
        let config = ShippingConfig::from_settings(&settings).expect("origin may be omitted");
        assert_eq!(config.origin, None);
    }

    #[rstest]
    #[case::latitude_only(("origin_lat", "-6.17"), None, "origin_lng")]
    #[case::longitude_only(("origin_lng", "106.82"), None, "origin_lat")]
    #[case::blank_longitude(("origin_lat", "-6.17"), Some(("origin_lng", "  ")), "origin_lng")]
    fn half_an_origin_requires_the_other(
        #[case] given: (&str, &str),
        #[case] partner: Option<(&str, &str)>,
        #[case] missing: &'static str,
    ) {
        let mut settings: BTreeMap<String, String> = [("api_key", "k"), given]
            .into_iter()
            .chain(partner)
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        settings.insert("cost_per_unit".to_owned(), "2500".to_owned());
        let err = ShippingConfig::from_settings(&settings).expect_err("half an origin");
        assert_eq!(err.errors, vec![SettingError::Required { field: missing }]);
    }

    #[rstest]
    #[case("yes", true)]
    #[case("No", false)]
    #[case("1", true)]
    fn flags_accept_common_spellings(#[case] raw: &str, #[case] expected: bool) {
        let value = FieldRule::Flag.check("multiple_drivers", Some(raw));
        assert_eq!(value, Ok(Some(SettingValue::Flag(expected))));
    }

    #[rstest]
    fn every_field_has_exactly_one_rule() {
        let mut keys: Vec<_> = SETTING_RULES.iter().map(|(f, _)| f.key()).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }
}
