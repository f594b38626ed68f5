//! Behavioural tests for `RateCalculator` using rstest-bdd.
//!
//! Scenarios run the calculator against a scripted distance service wrapped
//! in the in-memory cache, so lookups and cache hits are both observable.

use std::cell::RefCell;

use courier_core::test_support::ScriptedDistanceProvider;
use courier_core::{
    Address, CachedDistanceProvider, CartItem, DistanceError, DistanceResult, DistanceUnit,
    FormatMode, MemoryCache, NoRegionLookup, RateCalculator, RateOutcome, ShippingConfig,
};
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Shared state for rate calculator scenarios.
#[derive(Debug, Default)]
struct RateWorld {
    config: RefCell<ShippingConfig>,
    provider: ScriptedDistanceProvider,
    cache: MemoryCache,
    cart: RefCell<Vec<CartItem>>,
    destination: RefCell<Address>,
    outcomes: RefCell<Vec<RateOutcome>>,
}

impl RateWorld {
    fn compute(&self) {
        let calculator = RateCalculator::new(
            CachedDistanceProvider::new(&self.provider, &self.cache),
            NoRegionLookup,
        );
        let outcome = calculator.compute(
            &self.config.borrow(),
            &self.cart.borrow(),
            &self.destination.borrow(),
            FormatMode::Checkout,
        );
        self.outcomes.borrow_mut().push(outcome);
    }

    fn last_outcome(&self) -> RateOutcome {
        self.outcomes
            .borrow()
            .last()
            .cloned()
            .expect("a rate should have been computed")
    }
}

#[fixture]
fn world() -> RateWorld {
    RateWorld::default()
}

#[given("a same-day courier configuration")]
fn given_same_day(world: &RateWorld) {
    *world.config.borrow_mut() = ShippingConfig::same_day(
        "test-key",
        Coord {
            x: 106.827_173,
            y: -6.174_774,
        },
    );
}

#[given("fallback requests are enabled")]
fn given_fallback(world: &RateWorld) {
    world.config.borrow_mut().enable_fallback_request = true;
}

#[given("multiple drivers are allowed")]
fn given_multiple_drivers(world: &RateWorld) {
    world.config.borrow_mut().allow_multiple_drivers = true;
}

#[given("a cart with one small parcel")]
fn given_small_parcel(world: &RateWorld) {
    *world.cart.borrow_mut() = vec![CartItem::new(1.0, 20.0, 20.0, 5.0)];
}

#[given("a cart of three {weight} kg parcels")]
fn given_three_parcels(world: &RateWorld, weight: f64) {
    *world.cart.borrow_mut() = vec![CartItem::new(weight, 10.0, 10.0, 2.0); 3];
}

#[given("a destination with two address lines")]
fn given_destination(world: &RateWorld) {
    *world.destination.borrow_mut() = Address {
        address_line_1: Some("Jl. M.H. Thamrin No. 1".into()),
        address_line_2: Some("Grand Indonesia".into()),
        city: Some("Jakarta Pusat".into()),
        state: Some("JK".into()),
        postcode: Some("10310".into()),
        country: Some("ID".into()),
    };
}

#[given("the distance service reports {km} km")]
fn given_distance(world: &RateWorld, km: f64) {
    world.provider.push(Ok(DistanceResult::from_meters(
        km * 1_000.0,
        DistanceUnit::Metric,
        "{}",
    )));
}

#[given("the distance service finds no route")]
fn given_no_route(world: &RateWorld) {
    world.provider.push(Err(DistanceError::NoRoute {
        status: Some("NOT_FOUND".into()),
    }));
}

#[given("the distance service answers {status}")]
fn given_api_error(world: &RateWorld, status: String) {
    world.provider.push(Err(DistanceError::Api {
        status,
        message: String::new(),
    }));
}

#[when("the rate is computed")]
fn when_computed(world: &RateWorld) {
    world.compute();
}

#[when("the rate is computed twice")]
fn when_computed_twice(world: &RateWorld) {
    world.compute();
    world.compute();
    let outcomes = world.outcomes.borrow();
    assert_eq!(outcomes.first(), outcomes.last());
}

#[then("a rate costing {cost} is offered")]
fn then_rate_cost(world: &RateWorld, cost: f64) {
    let outcome = world.last_outcome();
    let rate = outcome.rate().expect("a rate should be offered");
    assert!(
        (rate.cost - cost).abs() < 1e-6,
        "expected cost {cost}, got {}",
        rate.cost
    );
}

#[then("the rate needs {drivers} drivers")]
fn then_drivers(world: &RateWorld, drivers: u32) {
    let outcome = world.last_outcome();
    assert_eq!(outcome.rate().expect("rate").driver_count, drivers);
}

#[then("the label shows the driver count")]
fn then_label(world: &RateWorld) {
    let outcome = world.last_outcome();
    let rate = outcome.rate().expect("rate");
    assert_eq!(rate.label, "Same Day (3 drivers)");
    assert_eq!(rate.id, "same_day_3");
}

#[then("no rate is offered")]
fn then_no_rate(world: &RateWorld) {
    assert!(matches!(world.last_outcome(), RateOutcome::Skip(_)));
}

#[then("the distance service was called {calls} times")]
fn then_calls(world: &RateWorld, calls: usize) {
    assert_eq!(world.provider.calls().len(), calls);
}

#[then("the last request omits the first address line")]
fn then_fallback_destination(world: &RateWorld) {
    let calls = world.provider.calls();
    let last = calls.last().expect("at least one request");
    assert!(!last.destination.contains("Thamrin"));
    assert!(last.destination.starts_with("Grand Indonesia,"));
}

macro_rules! register_scenario {
    ($name:ident, $index:literal) => {
        #[scenario(path = "tests/features/rate_calculator.feature", index = $index)]
        fn $name(world: RateWorld) {
            let _ = world;
        }
    };
}

register_scenario!(pricing_a_short_same_day_trip, 0);
register_scenario!(retrying_without_the_first_address_line, 1);
register_scenario!(serving_a_repeated_quote_from_the_cache, 2);
register_scenario!(refusing_a_trip_beyond_the_maximum_distance, 3);
register_scenario!(splitting_a_heavy_cart_across_drivers, 4);
register_scenario!(retrying_once_after_an_api_error, 5);
