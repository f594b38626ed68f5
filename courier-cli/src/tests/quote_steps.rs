//! Behaviour-driven step definitions driving the quote CLI scenarios.

use super::helpers::{QuoteFiles, StubProviderBuilder, km, settings_json, write_json};
use crate::quote::run_quote_with;
use crate::{ARG_CART, CliError, Cli, Command};
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;

struct QuoteWorld {
    files: QuoteFiles,
    include_cart: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    builder: RefCell<StubProviderBuilder>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl QuoteWorld {
    fn new() -> Self {
        Self {
            files: QuoteFiles::new(),
            include_cart: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            builder: RefCell::new(StubProviderBuilder::default()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["courier".to_owned(), "quote".to_owned()];
        argv.extend([
            "--settings".to_owned(),
            self.files.settings.as_str().to_owned(),
            "--destination".to_owned(),
            self.files.destination.as_str().to_owned(),
        ]);
        if *self.include_cart.borrow() {
            argv.extend([format!("--{ARG_CART}"), self.files.cart.as_str().to_owned()]);
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn output(&self) -> Value {
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be JSON")
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> QuoteWorld {
    QuoteWorld::new()
}

#[given("quote inputs exist on disk")]
fn quote_inputs_exist(#[from(world)] world: &QuoteWorld) {
    assert!(world.files.settings.as_std_path().is_file());
    assert!(world.files.cart.as_std_path().is_file());
    assert!(world.files.destination.as_std_path().is_file());
}

#[given("the distance service reports {distance} km")]
fn distance_service_reports(#[from(world)] world: &QuoteWorld, distance: f64) {
    world
        .builder
        .replace(StubProviderBuilder::replying(vec![Ok(km(distance))]));
}

#[given("I pass the API key {key}")]
fn pass_api_key(#[from(world)] world: &QuoteWorld, key: String) {
    world
        .cli_args
        .borrow_mut()
        .extend(["--api-key".to_owned(), key.trim_matches('"').to_owned()]);
}

#[given("the settings contain a negative cost")]
fn settings_contain_negative_cost(#[from(world)] world: &QuoteWorld) {
    let mut settings = settings_json();
    if let Value::Object(map) = &mut settings {
        map.insert("cost_per_unit".to_owned(), Value::from(-5));
    }
    write_json(&world.files.settings, &settings);
}

#[given("I omit the cart path")]
fn omit_cart_path(#[from(world)] world: &QuoteWorld) {
    *world.include_cart.borrow_mut() = false;
}

#[when("I run the quote command")]
fn run_quote_command(#[from(world)] world: &QuoteWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Quote(args) => {
            let builder = world.builder.borrow();
            let mut buffer = world.stdout.borrow_mut();
            run_quote_with(args, &*builder, &mut *buffer)
        }
        Command::CheckKey(_) => panic!("expected quote command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command prints a rate costing {cost}")]
fn command_prints_rate(#[from(world)] world: &QuoteWorld, cost: f64) {
    let output = world.output();
    assert_eq!(output["available"], Value::Bool(true));
    assert_eq!(output["outcome"]["outcome"], "rate");
    let rate = &output["outcome"]["detail"];
    assert_eq!(rate["cost"].as_f64(), Some(cost));
    assert_eq!(rate["label"], "Same Day");
    assert_eq!(rate["id"], "courier_1");
    assert_eq!(rate["driver_count"], 1);
    assert_eq!(rate["distance"]["text"], "10 km");
}

#[then("the distance service received key {key}")]
fn service_received_key(#[from(world)] world: &QuoteWorld, key: String) {
    let calls = world.builder.borrow().calls();
    assert_eq!(calls.len(), 1);
    let call = calls.first().expect("one lookup");
    assert_eq!(call.api_key, key.trim_matches('"'));
    assert_eq!(call.origin, "-6.17477373803497,106.82717425767213");
}

#[then("the command prints a skip because the distance is out of range")]
fn command_prints_out_of_range(#[from(world)] world: &QuoteWorld) {
    let output = world.output();
    assert_eq!(output["outcome"]["outcome"], "skip");
    let detail = &output["outcome"]["detail"];
    assert_eq!(detail["reason"], "distance_out_of_range");
    assert_eq!(detail["max"].as_f64(), Some(40.0));
}

#[then("the command fails because the settings are invalid")]
fn command_fails_invalid_settings(#[from(world)] world: &QuoteWorld) {
    match &*world.error() {
        CliError::InvalidSettings { source, .. } => {
            assert_eq!(source.errors.len(), 1);
            assert!(source.to_string().contains("cost_per_unit"));
        }
        other => panic!("expected InvalidSettings, found {other:?}"),
    }
}

#[then("the command fails because the cart path is missing")]
fn command_fails_missing_cart(#[from(world)] world: &QuoteWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_CART),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_quote_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/quote_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: QuoteWorld) {
            let _ = world;
        }
    };
}

register_quote_scenario!(quote_happy_path, "quoting a checkout delivery");
register_quote_scenario!(quote_api_key_override, "overriding the stored API key");
register_quote_scenario!(
    quote_out_of_range,
    "skipping a destination beyond the served range"
);
register_quote_scenario!(quote_invalid_settings, "rejecting invalid settings");
register_quote_scenario!(quote_missing_cart, "rejecting a missing cart path");
