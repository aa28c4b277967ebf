//! Test utilities and shared fixtures for EpiFig.
//!
//! Enabled for other crates through the `testing` feature. The payload
//! fixtures are frozen feature-service responses in the wire format the
//! ArcGIS client parses, so the whole pipeline can be exercised offline.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use crate::Endpoint;

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Frozen feature-service responses.
pub mod payloads {
    use super::Endpoint;

    /// 2021-01-01T00:00:00Z in epoch milliseconds.
    pub const JAN_1_2021_MS: i64 = 1_609_459_200_000;

    /// Milliseconds per day.
    pub const DAY_MS: i64 = 86_400_000;

    /// Administrative units, including one id (5315) that is deliberately absent.
    pub const ADMIN_UNITS: &str = r#"{
  "objectIdFieldName": "ObjectId",
  "features": [
    {"attributes": {"ObjectId": 1, "AdmUnitId": 0, "Name": "Bundesgebiet"}},
    {"attributes": {"ObjectId": 2, "AdmUnitId": 1, "Name": "Schleswig-Holstein"}},
    {"attributes": {"ObjectId": 3, "AdmUnitId": 2, "Name": "Hamburg"}},
    {"attributes": {"ObjectId": 4, "AdmUnitId": 9, "Name": "Bayern"}},
    {"attributes": {"ObjectId": 5, "AdmUnitId": 16, "Name": "Thüringen"}},
    {"attributes": {"ObjectId": 6, "AdmUnitId": 1001, "Name": "SK Flensburg"}},
    {"attributes": {"ObjectId": 7, "AdmUnitId": 9162, "Name": "SK München"}},
    {"attributes": {"ObjectId": 8, "AdmUnitId": 16077, "Name": "LK Altenburger Land"}}
  ]
}"#;

    /// Nationwide history, deliberately out of date order.
    pub const HISTORY: &str = r#"{
  "features": [
    {"attributes": {"ObjectId": 3, "BundeslandId": 0, "Datum": 1609632000000, "AnzFallMeldung": 300}, "geometry": null},
    {"attributes": {"ObjectId": 1, "BundeslandId": 0, "Datum": 1609459200000, "AnzFallMeldung": 100}, "geometry": null},
    {"attributes": {"ObjectId": 2, "BundeslandId": 0, "Datum": 1609545600000, "AnzFallMeldung": 200}, "geometry": null}
  ]
}"#;

    /// Key metrics for the nation, four states and four counties.
    pub const KEY_DATA: &str = r#"{
  "features": [
    {"attributes": {"AdmUnitId": 0, "BundeslandId": 0, "AnzFall": 1000, "Inz7T": 150.5}},
    {"attributes": {"AdmUnitId": 1, "BundeslandId": 1, "AnzFall": 100, "Inz7T": 120.0}},
    {"attributes": {"AdmUnitId": 2, "BundeslandId": 2, "AnzFall": 200, "Inz7T": 300.0}},
    {"attributes": {"AdmUnitId": 9, "BundeslandId": 9, "AnzFall": 300, "Inz7T": 210.25}},
    {"attributes": {"AdmUnitId": 16, "BundeslandId": 16, "AnzFall": 50, "Inz7T": 80.0}},
    {"attributes": {"AdmUnitId": 1001, "BundeslandId": 1, "AnzFall": 10, "Inz7T": 95.5}},
    {"attributes": {"AdmUnitId": 9162, "BundeslandId": 9, "AnzFall": 120, "Inz7T": 410.0}},
    {"attributes": {"AdmUnitId": 16077, "BundeslandId": 16, "AnzFall": 40, "Inz7T": 512.75}},
    {"attributes": {"AdmUnitId": 5315, "BundeslandId": 5, "AnzFall": 90, "Inz7T": 260.0}}
  ]
}"#;

    /// Nationwide case counts by age bracket and sex.
    pub const AGE_GROUPS: &str = r#"{
  "features": [
    {"attributes": {"BundeslandId": 0, "Altersgruppe": "A00-A04", "AnzFallM": 10, "AnzFallW": 8}},
    {"attributes": {"BundeslandId": 0, "Altersgruppe": "A05-A14", "AnzFallM": 20, "AnzFallW": 18}},
    {"attributes": {"BundeslandId": 0, "Altersgruppe": "A15-A34", "AnzFallM": 50, "AnzFallW": 55}},
    {"attributes": {"BundeslandId": 0, "Altersgruppe": "A35-A59", "AnzFallM": 60, "AnzFallW": 65}},
    {"attributes": {"BundeslandId": 0, "Altersgruppe": "A60-A79", "AnzFallM": 30, "AnzFallW": 35}},
    {"attributes": {"BundeslandId": 0, "Altersgruppe": "A80+", "AnzFallM": 10, "AnzFallW": 20}},
    {"attributes": {"BundeslandId": 0, "Altersgruppe": "unbekannt", "AnzFallM": 1, "AnzFallW": 0}}
  ]
}"#;

    /// An ArcGIS error envelope, returned with HTTP 200.
    pub const SERVICE_ERROR: &str = r#"{
  "error": {"code": 400, "message": "Cannot perform query. Invalid query parameters.", "details": ["'where' parameter is invalid"]}
}"#;

    /// The frozen payload for an endpoint.
    pub fn for_endpoint(endpoint: Endpoint) -> &'static str {
        match endpoint {
            Endpoint::AdminUnits => ADMIN_UNITS,
            Endpoint::History => HISTORY,
            Endpoint::KeyData => KEY_DATA,
            Endpoint::AgeGroups => AGE_GROUPS,
        }
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// A minimal configuration overriding a few chart settings.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
charts:
  history_days: 30
  top_n: 5
logging:
  level: debug
"#
    }

    /// A configuration pointing every endpoint at a local server.
    pub fn local_endpoints_yaml() -> &'static str {
        concat!(
            "api:\n",
            "  endpoints:\n",
            "    admin_units: \"http://localhost:8080/admunit/query\"\n",
            "    history: \"http://localhost:8080/history/query\"\n",
            "    key_data: \"http://localhost:8080/key_data/query\"\n",
            "    age_groups: \"http://localhost:8080/age_groups/query\"\n",
            "  timeout_secs: 5\n",
            "  max_retries: 0\n",
        )
    }
}
