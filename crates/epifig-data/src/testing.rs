//! Offline fetcher for tests.

use crate::arcgis::parse_feature_set;
use crate::fetcher::Fetcher;
use crate::query::QueryParams;
use crate::value::RawRecord;
use async_trait::async_trait;
use epifig_common::test_utils::payloads;
use epifig_common::{Endpoint, EpiFigError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Replays frozen feature-set bodies and records every query it receives.
///
/// Bodies go through the same parser as the live client, so an error
/// envelope in a body surfaces as the same `Retrieval` error.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<Endpoint, String>,
    failing: Option<Endpoint>,
    calls: Mutex<Vec<(Endpoint, QueryParams)>>,
}

impl StaticFetcher {
    /// Serve the shared payload fixtures for every endpoint.
    pub fn with_fixtures() -> Self {
        let bodies = Endpoint::ALL
            .iter()
            .map(|&endpoint| (endpoint, payloads::for_endpoint(endpoint).to_string()))
            .collect();
        Self {
            bodies,
            ..Self::default()
        }
    }

    /// Replace the body served for one endpoint.
    pub fn with_body(mut self, endpoint: Endpoint, body: impl Into<String>) -> Self {
        self.bodies.insert(endpoint, body.into());
        self
    }

    /// Fail every request to `endpoint` as an unreachable service would.
    pub fn failing_on(mut self, endpoint: Endpoint) -> Self {
        self.failing = Some(endpoint);
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<(Endpoint, QueryParams)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Queries sent to one endpoint, in call order.
    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<QueryParams> {
        self.calls()
            .into_iter()
            .filter(|(e, _)| *e == endpoint)
            .map(|(_, q)| q)
            .collect()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Vec<RawRecord>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((endpoint, query.clone()));
        }

        if self.failing == Some(endpoint) {
            return Err(EpiFigError::retrieval(format!("{endpoint} service unreachable")));
        }

        let body = self
            .bodies
            .get(&endpoint)
            .ok_or_else(|| EpiFigError::retrieval(format!("no body configured for {endpoint}")))?;
        parse_feature_set(body)
    }
}
