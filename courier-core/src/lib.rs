//! Core domain types and rate logic for the courier shipping engine.
//!
//! The crate is synchronous and performs no I/O of its own. Distance lookups
//! go through the [`DistanceProvider`] trait; the HTTP implementation lives in
//! `courier-data`. Region names come from a caller-supplied
//! [`RegionLookup`].
//!
//! # Examples
//! ```
//! use courier_core::{CartItem, LoadCaps, LoadPartitioner};
//!
//! let caps = LoadCaps { max_weight: Some(5.0), ..LoadCaps::default() };
//! let cart = [4.0, 4.0, 4.0].map(CartItem::with_weight);
//! let plan = LoadPartitioner::new(caps, true).partition(&cart)?;
//! assert_eq!(plan.driver_count(), 3);
//! # Ok::<(), courier_core::PartitionError>(())
//! ```

#![forbid(unsafe_code)]

pub mod address;
pub mod cache;
pub mod cart;
pub mod config;
pub mod distance;
pub mod partition;
pub mod rate;
pub mod units;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use address::{
    Address, AddressField, AddressFormatter, CalculatorPolicy, FormatMode, FormattedAddress,
    NoRegionLookup, RegionLookup,
};
pub use cache::{
    CacheKey, CachedDistanceProvider, DEFAULT_TTL, DistanceCache, MemoryCache, get_or_fetch,
};
pub use cart::CartItem;
pub use config::{
    DEFAULT_LOCALE, DEFAULT_METHOD_ID, DEFAULT_TITLE, FieldRule, RouteRestriction, SETTING_RULES,
    SettingError, SettingField, SettingsError, ShippingConfig, TaxStatus, TravelMode,
};
pub use distance::{
    DistanceError, DistanceProvider, DistanceQuery, DistanceResult, PROBE_DESTINATION,
    PROBE_ORIGIN, probe_api_key,
};
pub use partition::{Dimension, DriverLoad, LoadCaps, LoadPartitioner, LoadPlan, PartitionError};
pub use rate::{
    RateCalculator, RateDescriptor, RateOutcome, SkipReason, rate_cost, rate_id, rate_label,
};
pub use units::DistanceUnit;
