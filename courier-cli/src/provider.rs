//! Distance provider construction shared by the subcommands.

use std::time::Duration;

use courier_core::DistanceProvider;
use courier_data::{HttpDistanceProvider, HttpDistanceProviderConfig};

use crate::CliError;

/// Endpoint and timeout for the distance service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProviderSettings {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl ProviderSettings {
    /// Fill unset values from [`HttpDistanceProviderConfig::default`].
    pub(crate) fn resolve(base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        let defaults = HttpDistanceProviderConfig::default();
        Self {
            base_url: base_url.unwrap_or(defaults.base_url),
            timeout: timeout_secs.map_or(defaults.timeout, Duration::from_secs),
        }
    }
}

/// Builds the distance provider for one invocation.
pub(crate) trait DistanceProviderBuilder {
    fn build(&self, settings: &ProviderSettings) -> Result<Box<dyn DistanceProvider>, CliError>;
}

/// Builds an [`HttpDistanceProvider`].
pub(crate) struct HttpProviderBuilder;

impl DistanceProviderBuilder for HttpProviderBuilder {
    fn build(&self, settings: &ProviderSettings) -> Result<Box<dyn DistanceProvider>, CliError> {
        let config = HttpDistanceProviderConfig::new(settings.base_url.clone())
            .with_timeout(settings.timeout);
        let provider = HttpDistanceProvider::with_config(config).map_err(|source| {
            CliError::BuildDistanceProvider {
                base_url: settings.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(provider))
    }
}
