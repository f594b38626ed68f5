//! Quote command implementation for the courier CLI.

use std::collections::BTreeMap;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use courier_core::{
    Address, CachedDistanceProvider, CalculatorPolicy, CartItem, FormatMode, MemoryCache,
    RateCalculator, RateOutcome, RegionLookup, ShippingConfig,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fs::{read_json, require_existing};
use crate::provider::{DistanceProviderBuilder, HttpProviderBuilder, ProviderSettings};
use crate::{
    ARG_API_KEY, ARG_BASE_URL, ARG_CALCULATOR, ARG_CALCULATOR_CITY, ARG_CALCULATOR_POSTCODE,
    ARG_CART, ARG_DESTINATION, ARG_REGIONS, ARG_SETTINGS, ARG_TIMEOUT_SECS, CliError, ENV_CART,
    ENV_DESTINATION, ENV_SETTINGS,
};

/// Settings key overridden by `--api-key`.
const API_KEY_SETTING: &str = "api_key";

/// CLI arguments for the `quote` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Price a cart for delivery to one destination. Settings, \
                 cart and destination are JSON files; paths can come from \
                 CLI flags, configuration files, or environment variables.",
    about = "Quote a distance-priced courier rate"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct QuoteArgs {
    /// Path to a JSON object of stored shipping settings.
    #[arg(long = ARG_SETTINGS, value_name = "path")]
    #[serde(default)]
    pub(crate) settings: Option<Utf8PathBuf>,
    /// Path to a JSON array of cart items.
    #[arg(long = ARG_CART, value_name = "path")]
    #[serde(default)]
    pub(crate) cart: Option<Utf8PathBuf>,
    /// Path to a JSON destination address.
    #[arg(long = ARG_DESTINATION, value_name = "path")]
    #[serde(default)]
    pub(crate) destination: Option<Utf8PathBuf>,
    /// Optional JSON table of country and state names.
    #[arg(long = ARG_REGIONS, value_name = "path")]
    #[serde(default)]
    pub(crate) regions: Option<Utf8PathBuf>,
    /// Override the API key stored in the settings file.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Distance Matrix endpoint (defaults to the public Google URL).
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Price as an abbreviated shipping estimate instead of a checkout.
    #[arg(long = ARG_CALCULATOR)]
    #[serde(default)]
    pub(crate) calculator: bool,
    /// Keep the city in estimate mode.
    #[arg(long = ARG_CALCULATOR_CITY, requires = ARG_CALCULATOR)]
    #[serde(default)]
    pub(crate) calculator_city: bool,
    /// Keep the postcode in estimate mode.
    #[arg(long = ARG_CALCULATOR_POSTCODE, requires = ARG_CALCULATOR)]
    #[serde(default)]
    pub(crate) calculator_postcode: bool,
}

impl QuoteArgs {
    pub(crate) fn into_config(self) -> Result<QuoteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        QuoteConfig::try_from(merged)
    }
}

/// Resolved `quote` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuoteConfig {
    pub(crate) settings: Utf8PathBuf,
    pub(crate) cart: Utf8PathBuf,
    pub(crate) destination: Utf8PathBuf,
    pub(crate) regions: Option<Utf8PathBuf>,
    pub(crate) api_key: Option<String>,
    pub(crate) provider: ProviderSettings,
    pub(crate) mode: FormatMode,
}

impl QuoteConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.settings, ARG_SETTINGS)?;
        require_existing(&self.cart, ARG_CART)?;
        require_existing(&self.destination, ARG_DESTINATION)?;
        if let Some(regions) = &self.regions {
            require_existing(regions, ARG_REGIONS)?;
        }
        Ok(())
    }
}

impl TryFrom<QuoteArgs> for QuoteConfig {
    type Error = CliError;

    fn try_from(args: QuoteArgs) -> Result<Self, Self::Error> {
        let settings = args.settings.ok_or(CliError::MissingArgument {
            field: ARG_SETTINGS,
            env: ENV_SETTINGS,
        })?;
        let cart = args.cart.ok_or(CliError::MissingArgument {
            field: ARG_CART,
            env: ENV_CART,
        })?;
        let destination = args.destination.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION,
            env: ENV_DESTINATION,
        })?;
        let mode = if args.calculator {
            FormatMode::Calculator(CalculatorPolicy {
                enable_city: args.calculator_city,
                enable_postcode: args.calculator_postcode,
            })
        } else {
            FormatMode::Checkout
        };
        Ok(Self {
            settings,
            cart,
            destination,
            regions: args.regions,
            api_key: args.api_key.filter(|key| !key.trim().is_empty()),
            provider: ProviderSettings::resolve(args.base_url, args.timeout_secs),
            mode,
        })
    }
}

/// Country and state display names loaded from JSON.
///
/// ```json
/// { "countries": { "ID": "Indonesia" }, "states": { "ID": { "JK": "DKI Jakarta" } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct RegionTable {
    countries: BTreeMap<String, String>,
    states: BTreeMap<String, BTreeMap<String, String>>,
}

impl RegionLookup for RegionTable {
    fn country_name(&self, country_code: &str) -> Option<String> {
        self.countries.get(country_code).cloned()
    }

    fn state_name(&self, country_code: &str, state_code: &str) -> Option<String> {
        self.states
            .get(country_code)
            .and_then(|states| states.get(state_code))
            .cloned()
    }
}

/// JSON document printed by `quote`.
#[derive(Debug, Serialize)]
pub(crate) struct QuoteReport {
    /// Whether the method is offered at all for this cart and destination.
    pub(crate) available: bool,
    /// Result of pricing.
    pub(crate) outcome: RateOutcome,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_quote_with(args, &HttpProviderBuilder, &mut stdout)
}

pub(crate) fn run_quote_with(
    args: QuoteArgs,
    builder: &dyn DistanceProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_quote(args, builder)?;
    write_report(writer, &report)
}

fn execute_quote(
    args: QuoteArgs,
    builder: &dyn DistanceProviderBuilder,
) -> Result<QuoteReport, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;

    let shipping = load_shipping_config(&config.settings, config.api_key.as_deref())?;
    let cart: Vec<CartItem> = read_json(&config.cart, ARG_CART)?;
    let destination: Address = read_json(&config.destination, ARG_DESTINATION)?;
    let regions = match &config.regions {
        Some(path) => read_json(path, ARG_REGIONS)?,
        None => RegionTable::default(),
    };

    let provider = builder.build(&config.provider)?;
    let calculator = RateCalculator::new(
        CachedDistanceProvider::new(provider, MemoryCache::default()),
        regions,
    );
    let available = calculator.is_available(&cart, &destination);
    let outcome = calculator.compute(&shipping, &cart, &destination, config.mode);
    log::info!("quote finished (available: {available}, rate: {})", outcome.is_rate());
    Ok(QuoteReport { available, outcome })
}

/// Load and validate the stored settings at `path`.
pub(crate) fn load_shipping_config(
    path: &Utf8Path,
    api_key: Option<&str>,
) -> Result<ShippingConfig, CliError> {
    let raw: BTreeMap<String, Value> = read_json(path, ARG_SETTINGS)?;
    let mut settings = settings_as_text(raw, path)?;
    if let Some(key) = api_key {
        settings.insert(API_KEY_SETTING.to_owned(), key.to_owned());
    }
    ShippingConfig::from_settings(&settings).map_err(|source| CliError::InvalidSettings {
        path: path.to_path_buf(),
        source,
    })
}

/// Flatten JSON scalars into the stored text form; booleans become `yes`/`no`.
fn settings_as_text(
    raw: BTreeMap<String, Value>,
    path: &Utf8Path,
) -> Result<BTreeMap<String, String>, CliError> {
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => if flag { "yes" } else { "no" }.to_owned(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(CliError::UnsupportedSetting {
                        key,
                        path: path.to_path_buf(),
                    });
                }
            };
            Ok((key, text))
        })
        .collect()
}

fn write_report(writer: &mut dyn Write, report: &QuoteReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<QuoteConfig, CliError> {
    let merged = QuoteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    QuoteConfig::try_from(merged)
}
