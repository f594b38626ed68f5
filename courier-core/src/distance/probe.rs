//! Verify an API key with a single known-good lookup.

use crate::{DistanceUnit, RouteRestriction, TravelMode};

use super::{DistanceError, DistanceProvider, DistanceQuery, DistanceResult};

/// Origin of the probe request, central Jakarta.
pub const PROBE_ORIGIN: &str = "-6.17477373803497,106.82717425767213";

/// Destination of the probe request, about 1.3 km from [`PROBE_ORIGIN`].
pub const PROBE_DESTINATION: &str = "-6.181472315327319,106.8170462364319";

/// Issue one driving lookup between two fixed points to check `api_key`.
///
/// # Errors
///
/// Returns whatever the provider reports; [`DistanceError::Api`] with
/// `REQUEST_DENIED` is the usual sign of a bad key.
pub fn probe_api_key<P: DistanceProvider + ?Sized>(
    provider: &P,
    api_key: &str,
    locale: &str,
) -> Result<DistanceResult, DistanceError> {
    let query = DistanceQuery {
        api_key: api_key.trim().to_owned(),
        origin: PROBE_ORIGIN.to_owned(),
        destination: PROBE_DESTINATION.to_owned(),
        travel_mode: TravelMode::Driving,
        restriction: RouteRestriction::None,
        units: DistanceUnit::Metric,
        locale: locale.to_owned(),
    };
    log::debug!("probing distance matrix API key");
    provider.fetch(&query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedDistanceProvider;
    use rstest::rstest;

    #[rstest]
    fn sends_fixed_coordinates() {
        let provider = ScriptedDistanceProvider::default()
            .then_ok(DistanceResult::from_meters(1_300.0, DistanceUnit::Metric, ""));
        let result = probe_api_key(&provider, "key", "id").expect("probe succeeds");
        assert!((result.value - 1.3).abs() < f64::EPSILON);
        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].origin, PROBE_ORIGIN);
        assert_eq!(calls[0].destination, PROBE_DESTINATION);
        assert_eq!(calls[0].locale, "id");
    }

    #[rstest]
    fn blank_key_fails_without_lookup() {
        let provider = ScriptedDistanceProvider::default();
        let err = probe_api_key(&provider, "  ", "en").expect_err("no key");
        assert_eq!(err, DistanceError::MissingApiKey);
        assert!(provider.calls().is_empty());
    }
}
