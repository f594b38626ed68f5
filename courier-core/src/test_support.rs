//! Deterministic collaborators for unit and behaviour tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::{DistanceError, DistanceProvider, DistanceQuery, DistanceResult, RegionLookup};

/// `DistanceProvider` that replays queued responses and records every query
/// that passed validation.
///
/// When the queue runs dry, lookups fail with a network error.
#[derive(Debug, Default)]
pub struct ScriptedDistanceProvider {
    responses: Mutex<VecDeque<Result<DistanceResult, DistanceError>>>,
    calls: Mutex<Vec<DistanceQuery>>,
}

impl ScriptedDistanceProvider {
    /// Queue a successful lookup.
    #[must_use]
    pub fn then_ok(self, result: DistanceResult) -> Self {
        self.push(Ok(result));
        self
    }

    /// Queue a failed lookup.
    #[must_use]
    pub fn then_err(self, error: DistanceError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue a response on a shared provider.
    pub fn push(&self, response: Result<DistanceResult, DistanceError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Queries received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DistanceQuery> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DistanceProvider for ScriptedDistanceProvider {
    fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
        query.validate()?;
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(DistanceError::Network {
                    url: "scripted://distance".to_owned(),
                    message: "no scripted response left".to_owned(),
                })
            })
    }
}

/// In-memory country and state name table.
#[derive(Debug, Default, Clone)]
pub struct StaticRegionLookup {
    countries: HashMap<String, String>,
    states: HashMap<(String, String), String>,
}

impl StaticRegionLookup {
    /// Register a country name.
    #[must_use]
    pub fn with_country(mut self, code: &str, name: &str) -> Self {
        self.countries.insert(code.to_owned(), name.to_owned());
        self
    }

    /// Register a state name within a country.
    #[must_use]
    pub fn with_state(mut self, country: &str, code: &str, name: &str) -> Self {
        self.states
            .insert((country.to_owned(), code.to_owned()), name.to_owned());
        self
    }
}

impl RegionLookup for StaticRegionLookup {
    fn country_name(&self, country_code: &str) -> Option<String> {
        self.countries.get(country_code).cloned()
    }

    fn state_name(&self, country_code: &str, state_code: &str) -> Option<String> {
        self.states
            .get(&(country_code.to_owned(), state_code.to_owned()))
            .cloned()
    }
}
