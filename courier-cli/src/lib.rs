//! Command-line interface for pricing courier deliveries.
//!
//! `courier quote` prices a cart against stored shipping settings and prints
//! the [`courier_core::RateOutcome`] as JSON. `courier check-key` verifies a
//! Distance Matrix API key with a single probe lookup.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod check_key;
mod error;
mod fs;
mod provider;
mod quote;

pub use error::CliError;

use check_key::{CheckKeyArgs, run_check_key};
use quote::{QuoteArgs, run_quote};

pub(crate) const ARG_SETTINGS: &str = "settings";
pub(crate) const ARG_CART: &str = "cart";
pub(crate) const ARG_DESTINATION: &str = "destination";
pub(crate) const ARG_REGIONS: &str = "regions";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_CALCULATOR: &str = "calculator";
pub(crate) const ARG_CALCULATOR_CITY: &str = "calculator-city";
pub(crate) const ARG_CALCULATOR_POSTCODE: &str = "calculator-postcode";
pub(crate) const ARG_LOCALE: &str = "locale";
pub(crate) const ENV_SETTINGS: &str = "COURIER_CMDS_QUOTE_SETTINGS";
pub(crate) const ENV_CART: &str = "COURIER_CMDS_QUOTE_CART";
pub(crate) const ENV_DESTINATION: &str = "COURIER_CMDS_QUOTE_DESTINATION";
pub(crate) const ENV_API_KEY: &str = "COURIER_CMDS_CHECK_KEY_API_KEY";

/// Run the courier CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, an input
/// file cannot be read, or a probed API key is rejected.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Quote(args) => run_quote(args),
        Command::CheckKey(args) => run_check_key(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Distance-priced courier rates from the command line",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Price a cart for delivery to one destination.
    Quote(QuoteArgs),
    /// Verify a Distance Matrix API key with one probe request.
    CheckKey(CheckKeyArgs),
}

#[cfg(test)]
mod tests;
