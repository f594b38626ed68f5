//! Test helpers for composing quote inputs and stubbing the distance service.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use courier_core::test_support::ScriptedDistanceProvider;
use courier_core::{
    DistanceError, DistanceProvider, DistanceQuery, DistanceResult, DistanceUnit,
};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::CliError;
use crate::provider::{DistanceProviderBuilder, ProviderSettings};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test input");
}

pub(super) fn write_json(path: &Utf8Path, value: &Value) {
    let payload = serde_json::to_vec_pretty(value).expect("serialise test input");
    write_utf8(path, &payload);
}

/// Stored settings for a same-day courier serving up to 40 km.
pub(super) fn settings_json() -> Value {
    json!({
        "title": "Same Day",
        "api_key": "settings-key",
        "origin_lat": "-6.17477373803497",
        "origin_lng": "106.82717425767213",
        "travel_mode": "driving",
        "distance_unit": "metric",
        "cost_per_unit": 2500,
        "max_distance": "40",
        "multiple_drivers": false,
        "enable_fallback_request": true,
    })
}

/// Settings, cart and destination files in a temporary directory.
pub(super) struct QuoteFiles {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) settings: Utf8PathBuf,
    pub(super) cart: Utf8PathBuf,
    pub(super) destination: Utf8PathBuf,
}

impl QuoteFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let settings = root.join("settings.json");
        let cart = root.join("cart.json");
        let destination = root.join("destination.json");
        write_json(&settings, &settings_json());
        write_json(
            &cart,
            &json!([
                { "weight_kg": 1.5, "width_cm": 20, "length_cm": 30, "height_cm": 10 },
                { "weight_kg": 0.5, "width_cm": 10, "length_cm": 10, "height_cm": 5, "quantity": 2 },
            ]),
        );
        write_json(
            &destination,
            &json!({
                "address_line_1": "Jl. M.H. Thamrin No.1",
                "city": "Jakarta Pusat",
                "state": "JK",
                "postcode": "10310",
                "country": "ID",
            }),
        );
        Self {
            _dir: dir,
            root,
            settings,
            cart,
            destination,
        }
    }

    pub(super) fn args(&self) -> QuoteArgsBuilder {
        QuoteArgsBuilder {
            settings: Some(self.settings.clone()),
            cart: Some(self.cart.clone()),
            destination: Some(self.destination.clone()),
        }
    }
}

/// Paths handed to `QuoteArgs` in unit tests.
pub(super) struct QuoteArgsBuilder {
    pub(super) settings: Option<Utf8PathBuf>,
    pub(super) cart: Option<Utf8PathBuf>,
    pub(super) destination: Option<Utf8PathBuf>,
}

impl QuoteArgsBuilder {
    pub(super) fn build(self) -> crate::quote::QuoteArgs {
        crate::quote::QuoteArgs {
            settings: self.settings,
            cart: self.cart,
            destination: self.destination,
            ..crate::quote::QuoteArgs::default()
        }
    }
}

/// Kilometre result as the HTTP provider would decode it.
pub(super) fn km(value: f64) -> DistanceResult {
    DistanceResult::from_meters(value * 1000.0, DistanceUnit::Metric, "{}")
}

/// Provider shared between the builder and the test's assertions.
#[derive(Debug, Clone, Default)]
pub(super) struct SharedProvider(pub(super) Arc<ScriptedDistanceProvider>);

impl DistanceProvider for SharedProvider {
    fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
        self.0.fetch(query)
    }
}

/// Builder returning a scripted provider shared with the test.
#[derive(Debug, Default)]
pub(super) struct StubProviderBuilder {
    pub(super) provider: SharedProvider,
}

impl StubProviderBuilder {
    pub(super) fn replying(responses: Vec<Result<DistanceResult, DistanceError>>) -> Self {
        let builder = Self::default();
        for response in responses {
            builder.provider.0.push(response);
        }
        builder
    }

    pub(super) fn calls(&self) -> Vec<DistanceQuery> {
        self.provider.0.calls()
    }
}

impl DistanceProviderBuilder for StubProviderBuilder {
    fn build(&self, _settings: &ProviderSettings) -> Result<Box<dyn DistanceProvider>, CliError> {
        Ok(Box::new(self.provider.clone()))
    }
}
