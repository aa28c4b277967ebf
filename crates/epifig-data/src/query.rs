//! Feature-service query parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields;

/// The ArcGIS "always true" predicate.
pub const MATCH_ALL: &str = "1=1";

/// Output format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// ArcGIS JSON (`f=json`).
    Json,
}

impl ResponseFormat {
    /// Value of the `f` query parameter.
    pub const fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
        }
    }
}

/// Parameters of one feature-service query.
///
/// The filter clause is passed through verbatim; a malformed clause is
/// reported by the service, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// SQL-like `where` predicate.
    pub filter_clause: String,
    /// Comma-separated `outFields`; `*` selects all.
    pub field_selection: String,
    /// Ask for feature geometry alongside attributes.
    pub include_geometry: bool,
    /// Output format.
    pub response_format: ResponseFormat,
    /// Allow the service to answer from its cache.
    pub cache_hint: bool,
}

impl QueryParams {
    /// All fields, geometry and cache hint on, JSON output.
    pub fn build(filter_clause: impl Into<String>) -> Self {
        Self {
            filter_clause: filter_clause.into(),
            field_selection: "*".to_string(),
            include_geometry: true,
            response_format: ResponseFormat::Json,
            cache_hint: true,
        }
    }

    /// Toggle geometry.
    pub fn with_geometry(mut self, include_geometry: bool) -> Self {
        self.include_geometry = include_geometry;
        self
    }

    /// Toggle the cache hint.
    pub fn with_cache_hint(mut self, cache_hint: bool) -> Self {
        self.cache_hint = cache_hint;
        self
    }

    /// Render as ArcGIS REST query-string pairs.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("where", self.filter_clause.clone()),
            ("outFields", self.field_selection.clone()),
            ("returnGeometry", self.include_geometry.to_string()),
            ("f", self.response_format.as_str().to_string()),
            ("cacheHint", self.cache_hint.to_string()),
        ]
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        Self::build(MATCH_ALL)
    }
}

/// Query selecting every row.
pub fn build_query() -> QueryParams {
    QueryParams::default()
}

/// Query restricted by a filter clause.
pub fn build_filtered_query(filter_clause: impl Into<String>) -> QueryParams {
    QueryParams::build(filter_clause)
}

/// Rows belonging to one state id (0 = nationwide).
pub fn national_clause(state_id: i64) -> String {
    format!("{} = {state_id}", fields::BUNDESLAND_ID)
}

/// History rows strictly after `since` for one state id.
pub fn history_clause(since: NaiveDate, state_id: i64) -> String {
    format!(
        "{} > DATE '{}' and {}",
        fields::DATUM,
        since.format("%Y-%m-%d"),
        national_clause(state_id)
    )
}
