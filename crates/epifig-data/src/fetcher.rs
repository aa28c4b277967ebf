//! The retrieval boundary.

use crate::query::QueryParams;
use crate::value::RawRecord;
use async_trait::async_trait;
use epifig_common::{Endpoint, Result};
use std::sync::Arc;

/// Source of raw feature records.
///
/// Implementations own transport concerns (timeouts, retries, wire format);
/// callers see either flat records or a `Retrieval` error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Run `query` against the dataset named by `endpoint`.
    async fn fetch(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Vec<RawRecord>>;
}

#[async_trait]
impl<F> Fetcher for Arc<F>
where
    F: Fetcher + ?Sized,
{
    async fn fetch(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Vec<RawRecord>> {
        (**self).fetch(endpoint, query).await
    }
}
