//! Network adapters for the courier shipping engine.
//!
//! Responsibilities:
//! - Implement `courier_core::DistanceProvider` over HTTP.
//! - Decode the Distance Matrix JSON envelope.
//!
//! Boundaries:
//! - Do not encode pricing or partitioning rules (live in `courier-core`).
//! - Never retry; fallback policy belongs to the rate calculator.
//!
//! Invariants:
//! - API keys never appear in logs or error values.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod routing;

pub use routing::{HttpDistanceProvider, HttpDistanceProviderConfig, ProviderBuildError};
