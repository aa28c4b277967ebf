//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EpiFigError;

/// Identifier of an administrative unit (0 = nationwide, 1..=16 states, counties above).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AdmUnitId(pub i64);

impl fmt::Display for AdmUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The logical datasets served by the feature service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Administrative unit id to name mapping
    AdminUnits,
    /// Historical case counts per day and state
    History,
    /// Key metrics (incidence etc.) per administrative unit
    KeyData,
    /// Case counts by age bracket and sex
    AgeGroups,
}

impl Endpoint {
    /// All endpoints in fetch order.
    pub const ALL: [Endpoint; 4] = [
        Endpoint::AdminUnits,
        Endpoint::History,
        Endpoint::KeyData,
        Endpoint::AgeGroups,
    ];

    /// Stable identifier used in logs and configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Endpoint::AdminUnits => "admin_units",
            Endpoint::History => "history",
            Endpoint::KeyData => "key_data",
            Endpoint::AgeGroups => "age_groups",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = EpiFigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == s)
            .ok_or_else(|| EpiFigError::config(format!("Unknown endpoint '{s}'")))
    }
}
