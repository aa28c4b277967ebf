//! Configuration schema definitions using serde.

use epifig_common::{Endpoint, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Main configuration structure for EpiFig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feature-service API configuration.
    pub api: ApiConfig,
    /// Chart assembly settings.
    pub charts: ChartsConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Feature-service API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Query URL of each logical dataset.
    pub endpoints: EndpointsConfig,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host.
    pub max_idle_per_host: usize,
    /// Requests per second allowed against the service.
    pub rate_limit_per_sec: u32,
    /// Retry attempts for server errors and timeouts.
    pub max_retries: usize,
}

/// Query URLs of the four feature layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Administrative unit mapping layer.
    pub admin_units: String,
    /// Nationwide/state history layer.
    pub history: String,
    /// Key metrics layer.
    pub key_data: String,
    /// Age group and sex breakdown layer.
    pub age_groups: String,
}

impl EndpointsConfig {
    /// Query URL configured for an endpoint.
    pub fn url_for(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::AdminUnits => &self.admin_units,
            Endpoint::History => &self.history,
            Endpoint::KeyData => &self.key_data,
            Endpoint::AgeGroups => &self.age_groups,
        }
    }
}

/// Chart assembly settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Length of the time-series window in days.
    pub history_days: u32,
    /// Administrative unit id of the nationwide aggregate.
    pub national_id: i64,
    /// Inclusive id range of the states. Every id above it is a county.
    pub states: IdRangeConfig,
    /// Number of counties shown in the county ranking.
    pub top_n: usize,
    /// chrono format string for decoded dates.
    pub date_format: String,
    /// Ordered color tokens. Charts refer to them by index.
    pub palette: Vec<String>,
    /// Palette slots for the age-group pie, in bracket order.
    pub age_color_slots: Vec<usize>,
    /// Palette slots for the female and male slices.
    pub sex_color_slots: Vec<usize>,
}

/// Inclusive range of administrative unit ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRangeConfig {
    /// First id in the range.
    pub first: i64,
    /// Last id in the range.
    pub last: i64,
}

impl IdRangeConfig {
    /// The range as an inclusive std range.
    pub fn as_range(&self) -> RangeInclusive<i64> {
        self.first..=self.last
    }

    /// First id after the range, `None` when the range ends at `i64::MAX`.
    pub fn next_after(&self) -> Option<i64> {
        self.last.checked_add(1)
    }
}
