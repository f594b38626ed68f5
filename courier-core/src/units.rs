//! Distance units and conversion from the metres reported upstream.
//!
//! The distance matrix service always reports distances in metres. Rates are
//! priced per kilometre or per mile depending on the configured unit, so every
//! distance passes through [`DistanceUnit::convert_meters`] before pricing.
//!
//! # Examples
//! ```
//! use courier_core::DistanceUnit;
//!
//! assert_eq!(DistanceUnit::Metric.convert_meters(1000.0), 1.0);
//! assert_eq!(DistanceUnit::Imperial.label(), "mi");
//! ```

/// Kilometres in one metre.
const KILOMETRES_PER_METRE: f64 = 0.001;

/// Miles in one metre.
const MILES_PER_METRE: f64 = 0.000_621_371;

/// Unit system used for the request and for pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceUnit {
    /// Kilometres.
    #[default]
    Metric,
    /// Miles.
    Imperial,
}

impl DistanceUnit {
    /// Return the value sent as the `units` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Return the short label appended to formatted distances.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Metric => "km",
            Self::Imperial => "mi",
        }
    }

    /// Convert a distance in metres into this unit.
    #[must_use]
    pub fn convert_meters(self, meters: f64) -> f64 {
        match self {
            Self::Metric => meters * KILOMETRES_PER_METRE,
            Self::Imperial => meters * MILES_PER_METRE,
        }
    }

    /// Format `value` with the unit label, e.g. `"12.5 km"`.
    ///
    /// Whole numbers are printed without a fractional part.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        let rounded = (value * 100.0).round() / 100.0;
        if rounded.fract() == 0.0 {
            format!("{rounded:.0} {}", self.label())
        } else {
            format!("{rounded} {}", self.label())
        }
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            _ => Err(format!("unknown distance unit '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    fn metric_converts_to_kilometres() {
        assert!((DistanceUnit::Metric.convert_meters(1000.0) - 1.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn imperial_mile_is_close_to_one() {
        let miles = DistanceUnit::Imperial.convert_meters(1609.0);
        assert!((miles - 1.0).abs() < 0.001, "got {miles}");
    }

    #[rstest]
    #[case(DistanceUnit::Metric, 12.0, "12 km")]
    #[case(DistanceUnit::Metric, 12.345, "12.35 km")]
    #[case(DistanceUnit::Imperial, 3.5, "3.5 mi")]
    fn format_appends_label(
        #[case] unit: DistanceUnit,
        #[case] value: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(unit.format(value), expected);
    }

    #[rstest]
    fn parsing_rejects_unknown() {
        let err = DistanceUnit::from_str("parsecs").unwrap_err();
        assert!(err.contains("unknown distance unit"));
    }
}
