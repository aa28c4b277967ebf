//! Configuration loading utilities

use crate::schema::Config;
use crate::validator::{ConfigError, ConfigValidator};
use epifig_common::Result as EpiFigResult;
use std::env;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "EPIFIG_CONFIG_PATH";

/// Files tried in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["epifig.yaml", "epifig.yml"];

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        debug!(path = %path.as_ref().display(), "Reading configuration file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;

        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Parse YAML text. Missing sections and fields take their defaults.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from `EPIFIG_CONFIG_PATH`, a default file, or the defaults
    pub fn load() -> EpiFigResult<Config> {
        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            info!(path = %config_path, "Loading configuration");
            return Ok(Self::load_config(&config_path)?);
        }

        if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .find(|candidate| Path::new(candidate).exists())
        {
            info!(path = %path, "Loading configuration");
            return Ok(Self::load_config(path)?);
        }

        info!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> EpiFigResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(days) = parse_var(&lookup, "EPIFIG_HISTORY_DAYS")? {
            config.charts.history_days = days;
        }
        if let Some(top_n) = parse_var(&lookup, "EPIFIG_TOP_N")? {
            config.charts.top_n = top_n;
        }
        if let Some(timeout) = parse_var(&lookup, "EPIFIG_TIMEOUT")? {
            config.api.timeout_secs = timeout;
        }
        if let Some(retries) = parse_var(&lookup, "EPIFIG_MAX_RETRIES")? {
            config.api.max_retries = retries;
        }
        if let Some(level) = lookup("EPIFIG_LOG_LEVEL") {
            config.logging.level = level;
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::EnvParse {
                var: var.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ConfigLoader::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = ConfigLoader::parse("charts:\n  top_n: 3\n").unwrap();
        assert_eq!(config.charts.top_n, 3);
        assert_eq!(config.charts.history_days, 60);
        assert_eq!(config.api, Config::default().api);
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("EPIFIG_HISTORY_DAYS", "14"),
            ("EPIFIG_TOP_N", " 5 "),
            ("EPIFIG_MAX_RETRIES", "0"),
            ("EPIFIG_LOG_LEVEL", "epifig_data=trace"),
        ]);
        ConfigLoader::apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.charts.history_days, 14);
        assert_eq!(config.charts.top_n, 5);
        assert_eq!(config.api.max_retries, 0);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.logging.level, "epifig_data=trace");
    }

    #[test]
    fn test_bad_override_names_variable() {
        let mut config = Config::default();
        let lookup = lookup_from(&[("EPIFIG_TOP_N", "ten")]);
        let err = ConfigLoader::apply_overrides(&mut config, lookup).unwrap_err();
        assert!(err.to_string().contains("EPIFIG_TOP_N"));
    }
}
