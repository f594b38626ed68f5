//! Resolve road distances between the store and a customer.
//!
//! [`DistanceProvider`] is the seam between the pure rate logic and the
//! network. The HTTP implementation lives in `courier-data`; tests use the
//! scripted provider from [`crate::test_support`].

mod error;
mod probe;
mod provider;

pub use error::DistanceError;
pub use probe::{PROBE_DESTINATION, PROBE_ORIGIN, probe_api_key};
pub use provider::{DistanceProvider, DistanceQuery, DistanceResult};
