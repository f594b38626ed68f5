//! HTTP distance providers for the Distance Matrix API.
//!
//! This module provides [`HttpDistanceProvider`], an implementation of
//! [`courier_core::DistanceProvider`] that resolves road distances with one
//! request per lookup.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use courier_core::{CachedDistanceProvider, MemoryCache, probe_api_key};
//! use courier_data::routing::{HttpDistanceProvider, HttpDistanceProviderConfig};
//!
//! let config = HttpDistanceProviderConfig::default()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-shop/1.0");
//! let provider = CachedDistanceProvider::new(
//!     HttpDistanceProvider::with_config(config)?,
//!     MemoryCache::default(),
//! );
//!
//! let distance = probe_api_key(&provider, "secret", "en")?;
//! println!("Probe distance: {}", distance.text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod matrix;
mod provider;

pub use matrix::{MatrixElement, MatrixResponse, MatrixRow, STATUS_OK, TextValue};
pub use provider::{
    DEFAULT_USER_AGENT, GOOGLE_DISTANCE_MATRIX_URL, HttpDistanceProvider,
    HttpDistanceProviderConfig, ProviderBuildError,
};
