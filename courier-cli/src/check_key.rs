//! API key verification command.

use std::io::Write;

use clap::Parser;
use courier_core::{DEFAULT_LOCALE, probe_api_key};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::provider::{DistanceProviderBuilder, HttpProviderBuilder, ProviderSettings};
use crate::{ARG_API_KEY, ARG_BASE_URL, ARG_LOCALE, ARG_TIMEOUT_SECS, CliError, ENV_API_KEY};

/// CLI arguments for the `check-key` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Verify a Distance Matrix API key with one probe lookup")]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct CheckKeyArgs {
    /// API key to verify.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Response language for the probe request.
    #[arg(long = ARG_LOCALE, value_name = "tag")]
    #[serde(default)]
    pub(crate) locale: Option<String>,
    /// Distance Matrix endpoint (defaults to the public Google URL).
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

/// Resolved `check-key` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckKeyConfig {
    pub(crate) api_key: String,
    pub(crate) locale: String,
    pub(crate) provider: ProviderSettings,
}

impl TryFrom<CheckKeyArgs> for CheckKeyConfig {
    type Error = CliError;

    fn try_from(args: CheckKeyArgs) -> Result<Self, Self::Error> {
        let api_key = args
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_API_KEY,
                env: ENV_API_KEY,
            })?;
        Ok(Self {
            api_key,
            locale: args.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_owned()),
            provider: ProviderSettings::resolve(args.base_url, args.timeout_secs),
        })
    }
}

/// JSON document printed when the key works.
#[derive(Debug, Serialize)]
struct KeyReport {
    valid: bool,
    distance: String,
}

pub(crate) fn run_check_key(args: CheckKeyArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_check_key_with(args, &HttpProviderBuilder, &mut stdout)
}

pub(crate) fn run_check_key_with(
    args: CheckKeyArgs,
    builder: &dyn DistanceProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = CheckKeyConfig::try_from(merged)?;
    let provider = builder.build(&config.provider)?;
    let result =
        probe_api_key(&provider, &config.api_key, &config.locale).map_err(CliError::KeyRejected)?;
    let report = KeyReport {
        valid: true,
        distance: result.text,
    };
    let payload = serde_json::to_string_pretty(&report).map_err(CliError::SerialiseOutput)?;
    writeln!(writer, "{payload}").map_err(CliError::WriteOutput)
}
