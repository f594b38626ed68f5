//! Distance Matrix API response envelope.
//!
//! A response carries a top-level `status` and, when that is `OK`, one row
//! per origin holding one element per destination. Each element has its own
//! status, so a successful envelope may still contain no route.
//!
//! See: <https://developers.google.com/maps/documentation/distance-matrix/distance-matrix#DistanceMatrixResponse>

use courier_core::DistanceError;
use serde::Deserialize;

/// Status value marking success at both envelope and element level.
pub const STATUS_OK: &str = "OK";

/// Top-level Distance Matrix response.
#[derive(Debug, Deserialize)]
pub struct MatrixResponse {
    /// Envelope status, e.g. `OK`, `REQUEST_DENIED`, `OVER_QUERY_LIMIT`.
    pub status: String,

    /// Explanation accompanying a non-`OK` status.
    #[serde(default)]
    pub error_message: Option<String>,

    /// One row per origin.
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

/// Results for one origin.
#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    /// One element per destination.
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// Result for one origin/destination pairing.
#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    /// Pairing status, e.g. `OK`, `NOT_FOUND`, `ZERO_RESULTS`.
    pub status: String,

    /// Route length; absent unless `status` is `OK`.
    #[serde(default)]
    pub distance: Option<TextValue>,
}

/// Numeric value with its localised rendering.
#[derive(Debug, Deserialize)]
pub struct TextValue {
    /// Value in metres.
    pub value: f64,
    /// Display text from the service.
    pub text: String,
}

impl MatrixResponse {
    /// Check if the envelope indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Return the first successful, non-zero route length in metres.
    ///
    /// The scan stops at the first hit. Non-`OK` element statuses are
    /// remembered so the last one can be reported when nothing succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::Api`] for a non-`OK` envelope and
    /// [`DistanceError::NoRoute`] when no element yields a distance.
    pub fn first_route_meters(&self) -> Result<f64, DistanceError> {
        if !self.is_ok() {
            return Err(DistanceError::Api {
                status: self.status.clone(),
                message: self.error_message.clone().unwrap_or_default(),
            });
        }

        let mut pending = None;
        for element in self.rows.iter().flat_map(|row| row.elements.iter()) {
            if element.status != STATUS_OK {
                pending = Some(element.status.clone());
                continue;
            }
            if let Some(meters) = element
                .distance
                .as_ref()
                .map(|distance| distance.value)
                .filter(|value| value.is_finite() && *value > 0.0)
            {
                return Ok(meters);
            }
        }
        Err(DistanceError::NoRoute { status: pending })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(json: &str) -> MatrixResponse {
        serde_json::from_str(json).expect("should deserialise")
    }

    #[rstest]
    fn deserialise_success_response() {
        let response = parse(
            r#"{
                "destination_addresses": ["Jakarta, Indonesia"],
                "origin_addresses": ["Jakarta, Indonesia"],
                "rows": [{"elements": [{
                    "distance": {"text": "1.3 km", "value": 1303},
                    "duration": {"text": "4 mins", "value": 240},
                    "status": "OK"
                }]}],
                "status": "OK"
            }"#,
        );
        assert!(response.is_ok());
        assert_eq!(response.first_route_meters(), Ok(1303.0));
    }

    #[rstest]
    fn top_level_error_is_api_error() {
        let response = parse(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "rows": []}"#,
        );
        assert_eq!(
            response.first_route_meters(),
            Err(DistanceError::Api {
                status: "REQUEST_DENIED".into(),
                message: "The provided API key is invalid.".into(),
            })
        );
    }

    #[rstest]
    fn first_success_wins_over_later_elements() {
        let response = parse(
            r#"{"status": "OK", "rows": [
                {"elements": [
                    {"status": "NOT_FOUND"},
                    {"status": "OK", "distance": {"text": "5 km", "value": 5000}},
                    {"status": "OK", "distance": {"text": "9 km", "value": 9000}}
                ]}
            ]}"#,
        );
        assert_eq!(response.first_route_meters(), Ok(5000.0));
    }

    #[rstest]
    fn zero_distance_does_not_win() {
        let response = parse(
            r#"{"status": "OK", "rows": [
                {"elements": [{"status": "OK", "distance": {"text": "1 m", "value": 0}}]},
                {"elements": [{"status": "OK", "distance": {"text": "2 km", "value": 2000}}]}
            ]}"#,
        );
        assert_eq!(response.first_route_meters(), Ok(2000.0));
    }

    #[rstest]
    fn last_element_error_is_reported() {
        let response = parse(
            r#"{"status": "OK", "rows": [
                {"elements": [{"status": "NOT_FOUND"}, {"status": "ZERO_RESULTS"}]}
            ]}"#,
        );
        assert_eq!(
            response.first_route_meters(),
            Err(DistanceError::NoRoute {
                status: Some("ZERO_RESULTS".into())
            })
        );
    }

    #[rstest]
    fn empty_rows_mean_no_route() {
        let response = parse(r#"{"status": "OK", "rows": []}"#);
        assert_eq!(
            response.first_route_meters(),
            Err(DistanceError::NoRoute { status: None })
        );
    }
}
