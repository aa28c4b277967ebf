//! Runtime validation of a loaded configuration.

use crate::schema::{ChartsConfig, Config};
use epifig_common::Endpoint;
use thiserror::Error;
use url::Url;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field holds a value the pipeline cannot work with
    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParse {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for epifig_common::EpiFigError {
    fn from(err: ConfigError) -> Self {
        epifig_common::EpiFigError::config_with_source(err.to_string(), err)
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting the first offending field.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        for endpoint in Endpoint::ALL {
            let raw = config.api.endpoints.url_for(endpoint);
            let field = format!("api.endpoints.{endpoint}");
            let url = Url::parse(raw).map_err(|e| ConfigError::invalid(&field, e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::invalid(field, "URL must use http or https"));
            }
        }

        if config.api.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "api.timeout_secs",
                "must be greater than 0",
            ));
        }
        if config.api.rate_limit_per_sec == 0 {
            return Err(ConfigError::invalid(
                "api.rate_limit_per_sec",
                "must be greater than 0",
            ));
        }

        Self::validate_charts(&config.charts)
    }

    fn validate_charts(charts: &ChartsConfig) -> Result<(), ConfigError> {
        if charts.history_days == 0 {
            return Err(ConfigError::invalid(
                "charts.history_days",
                "must be greater than 0",
            ));
        }
        if charts.states.first > charts.states.last {
            return Err(ConfigError::invalid(
                "charts.states",
                format!(
                    "first id {} is above last id {}",
                    charts.states.first, charts.states.last
                ),
            ));
        }
        if charts.states.next_after().is_none() {
            return Err(ConfigError::invalid(
                "charts.states.last",
                "must leave room for county ids",
            ));
        }
        if charts.national_id >= charts.states.first && charts.national_id <= charts.states.last {
            return Err(ConfigError::invalid(
                "charts.national_id",
                "must lie outside the state id range",
            ));
        }
        if charts.top_n == 0 {
            return Err(ConfigError::invalid("charts.top_n", "must be greater than 0"));
        }
        if charts.date_format.trim().is_empty() {
            return Err(ConfigError::invalid("charts.date_format", "cannot be empty"));
        }
        if charts.palette.is_empty() {
            return Err(ConfigError::invalid("charts.palette", "cannot be empty"));
        }

        for (field, slots) in [
            ("charts.age_color_slots", &charts.age_color_slots),
            ("charts.sex_color_slots", &charts.sex_color_slots),
        ] {
            if slots.is_empty() {
                return Err(ConfigError::invalid(field, "cannot be empty"));
            }
            if let Some(slot) = slots.iter().find(|slot| **slot >= charts.palette.len()) {
                return Err(ConfigError::invalid(
                    field,
                    format!(
                        "slot {slot} is outside the palette of {} colors",
                        charts.palette.len()
                    ),
                ));
            }
        }
        if charts.sex_color_slots.len() != 2 {
            return Err(ConfigError::invalid(
                "charts.sex_color_slots",
                "needs exactly two slots (female, male)",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.api.endpoints.history = "ftp://example.com/query".to_string();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("api.endpoints.history"));
    }

    #[test]
    fn test_rejects_unparseable_endpoint() {
        let mut config = Config::default();
        config.api.endpoints.key_data = "not a url".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_rejects_slot_outside_palette() {
        let mut config = Config::default();
        config.charts.age_color_slots.push(9);
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for 'charts.age_color_slots': slot 9 is outside the palette of 9 colors"
        );
    }

    #[test]
    fn test_rejects_inverted_state_range() {
        let mut config = Config::default();
        config.charts.states.first = 17;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_rejects_state_range_ending_at_max_id() {
        let mut config = Config::default();
        config.charts.states.last = i64::MAX;
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for 'charts.states.last': must leave room for county ids"
        );
    }

    #[test]
    fn test_rejects_national_id_inside_states() {
        let mut config = Config::default();
        config.charts.national_id = 3;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_rate_limit() {
        let mut config = Config::default();
        config.api.rate_limit_per_sec = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_rejects_three_sex_slots() {
        let mut config = Config::default();
        config.charts.sex_color_slots = vec![1, 2, 3];
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
