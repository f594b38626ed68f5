//! Facade crate for the courier rate engine.
//!
//! This crate re-exports the core domain types and exposes the HTTP distance
//! provider behind the `http` feature.

#![forbid(unsafe_code)]

pub use courier_core::{
    Address, AddressField, AddressFormatter, CacheKey, CachedDistanceProvider, CalculatorPolicy,
    CartItem, DistanceCache, DistanceError, DistanceProvider, DistanceQuery, DistanceResult,
    DistanceUnit, FormatMode, LoadCaps, LoadPartitioner, LoadPlan, MemoryCache, NoRegionLookup,
    PartitionError, RateCalculator, RateDescriptor, RateOutcome, RegionLookup, RouteRestriction,
    SettingsError, ShippingConfig, SkipReason, TravelMode, probe_api_key,
};

#[cfg(feature = "http")]
pub use courier_data::{HttpDistanceProvider, HttpDistanceProviderConfig, ProviderBuildError};

#[cfg(feature = "test-support")]
pub use courier_core::test_support;
