//! Default values: the production RKI feature layers and the "Blues" palette.

use crate::schema::*;
use epifig_common::LoggingConfig;

const SERVICE_ROOT: &str = "https://services7.arcgis.com/mOBPykOjAyBO2ZKk/arcgis/rest/services";

/// Sequential blue palette, lightest first.
pub const BLUES: [&str; 9] = [
    "rgb(247,251,255)",
    "rgb(222,235,247)",
    "rgb(198,219,239)",
    "rgb(158,202,225)",
    "rgb(107,174,214)",
    "rgb(66,146,198)",
    "rgb(33,113,181)",
    "rgb(8,81,156)",
    "rgb(8,48,107)",
];

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            charts: ChartsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointsConfig::default(),
            timeout_secs: 30,
            max_idle_per_host: 4,
            rate_limit_per_sec: 10,
            max_retries: 3,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        let layer = |name: &str| format!("{SERVICE_ROOT}/{name}/FeatureServer/0/query");
        Self {
            admin_units: layer("rki_admunit_v"),
            history: layer("rki_history_blbrdv"),
            key_data: layer("rki_key_data_v"),
            age_groups: layer("rki_altersgruppen_v"),
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            history_days: 60,
            national_id: 0,
            states: IdRangeConfig { first: 1, last: 16 },
            top_n: 10,
            date_format: "%Y-%m-%d".to_string(),
            palette: BLUES.iter().map(|c| (*c).to_string()).collect(),
            age_color_slots: vec![0, 1, 4, 6, 7, 8],
            sex_color_slots: vec![4, 8],
        }
    }
}
