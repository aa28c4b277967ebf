//! ArcGIS feature-service client with connection pooling, rate limiting and
//! retries.
//!
//! This is the only place that knows the `features` / `attributes` wire
//! envelope. Everything downstream sees flat [`RawRecord`]s.

use crate::fetcher::Fetcher;
use crate::query::QueryParams;
use crate::value::RawRecord;
use async_trait::async_trait;
use epifig_common::{Endpoint, EpiFigError, Result};
use epifig_config::ApiConfig;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::Client;
use serde::Deserialize;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, error, info, instrument, warn};

/// Feature-service client.
#[derive(Debug, Clone)]
pub struct ArcGisClient {
    client: Client,
    config: ApiConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

/// A failed attempt and whether trying again could help.
struct RequestFailure {
    error: EpiFigError,
    transient: bool,
}

impl RequestFailure {
    fn transient(error: EpiFigError) -> Self {
        Self {
            error,
            transient: true,
        }
    }

    fn permanent(error: EpiFigError) -> Self {
        Self {
            error,
            transient: false,
        }
    }
}

impl ArcGisClient {
    /// Create a new client with the given configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| EpiFigError::retrieval_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| EpiFigError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Connection settings in use.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Query URL for an endpoint.
    pub fn url_for(&self, endpoint: Endpoint) -> &str {
        self.config.endpoints.url_for(endpoint)
    }

    /// GET the query, retrying server errors, timeouts and connection failures.
    #[instrument(skip(self, pairs))]
    async fn request_body(&self, url: &str, pairs: &[(&'static str, String)]) -> Result<String> {
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        RetryIf::spawn(
            retry_strategy,
            || self.attempt(url, pairs),
            |failure: &RequestFailure| failure.transient,
        )
        .await
        .map_err(|failure| failure.error)
    }

    async fn attempt(
        &self,
        url: &str,
        pairs: &[(&'static str, String)],
    ) -> std::result::Result<String, RequestFailure> {
        self.rate_limiter.until_ready().await;
        debug!("Sending request with {} parameters", pairs.len());

        match self.client.get(url).query(pairs).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    response.text().await.map_err(|e| {
                        warn!("Failed to read response body, will retry: {}", e);
                        RequestFailure::transient(EpiFigError::retrieval_with_source(
                            "Failed to read response body",
                            e,
                        ))
                    })
                } else if status.is_server_error() {
                    warn!("Server error, will retry: {}", status);
                    Err(RequestFailure::transient(EpiFigError::retrieval_with_status(
                        format!("Feature service returned server error: {status}"),
                        status.as_u16(),
                    )))
                } else {
                    error!("Client error: {}", status);
                    Err(RequestFailure::permanent(EpiFigError::retrieval_with_status(
                        format!("Feature service returned client error: {status}"),
                        status.as_u16(),
                    )))
                }
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                warn!("Transport error, will retry: {}", e);
                Err(RequestFailure::transient(e.into()))
            }
            Err(e) => {
                error!("Request failed: {}", e);
                Err(RequestFailure::permanent(e.into()))
            }
        }
    }
}

#[async_trait]
impl Fetcher for ArcGisClient {
    #[instrument(skip(self, query), fields(endpoint = %endpoint, filter = %query.filter_clause))]
    async fn fetch(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Vec<RawRecord>> {
        let body = self
            .request_body(self.url_for(endpoint), &query.to_query_pairs())
            .await?;
        let records = parse_feature_set(&body)?;
        info!(records = records.len(), "Fetched {}", endpoint);
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureSetResponse {
    features: Option<Vec<Feature>>,
    error: Option<ServiceError>,
    #[serde(default, rename = "exceededTransferLimit")]
    exceeded_transfer_limit: bool,
}

#[derive(Debug, Deserialize)]
struct Feature {
    attributes: RawRecord,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    code: Option<u16>,
    message: Option<String>,
    #[serde(default)]
    details: Vec<String>,
}

/// Decode a feature-set JSON body into flat records.
///
/// A service error envelope, a body that is not JSON, or a body without a
/// `features` collection is a `Retrieval` error.
pub fn parse_feature_set(body: &str) -> Result<Vec<RawRecord>> {
    let response: FeatureSetResponse = serde_json::from_str(body)
        .map_err(|e| EpiFigError::retrieval_with_source("Malformed feature-set payload", e))?;

    if let Some(service_error) = response.error {
        let mut message = service_error
            .message
            .unwrap_or_else(|| "Unknown feature service error".to_string());
        if !service_error.details.is_empty() {
            message = format!("{message} ({})", service_error.details.join("; "));
        }
        return Err(match service_error.code {
            Some(code) => EpiFigError::retrieval_with_status(message, code),
            None => EpiFigError::retrieval(message),
        });
    }

    let features = response
        .features
        .ok_or_else(|| EpiFigError::retrieval("Payload has no 'features' collection"))?;

    if response.exceeded_transfer_limit {
        warn!(
            records = features.len(),
            "Feature service truncated the result at its transfer limit"
        );
    }

    Ok(features.into_iter().map(|f| f.attributes).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use epifig_common::test_utils::payloads;

    #[test]
    fn test_client_creation() {
        assert!(ArcGisClient::new(ApiConfig::default()).is_ok());
    }

    #[test]
    fn test_rate_limit_validation() {
        let config = ApiConfig {
            rate_limit_per_sec: 0,
            ..ApiConfig::default()
        };
        let err = ArcGisClient::new(config).unwrap_err();
        assert!(err.to_string().contains("Rate limit must be greater than 0"));
    }

    #[test]
    fn test_url_for_endpoint() {
        let client = ArcGisClient::new(ApiConfig::default()).unwrap();
        assert!(client
            .url_for(Endpoint::KeyData)
            .ends_with("/rki_key_data_v/FeatureServer/0/query"));
    }

    #[test]
    fn test_parse_flattens_attributes() {
        let records = parse_feature_set(payloads::HISTORY).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1]["Datum"], Value::Int(payloads::JAN_1_2021_MS));
        assert_eq!(records[0]["AnzFallMeldung"], Value::Int(300));
    }

    #[test]
    fn test_parse_service_error() {
        let err = parse_feature_set(payloads::SERVICE_ERROR).unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert!(err.to_string().contains("Invalid query parameters"));
        assert!(err.to_string().contains("'where' parameter is invalid"));
    }

    #[test]
    fn test_parse_missing_features() {
        let err = parse_feature_set(r#"{"fields": []}"#).unwrap_err();
        assert!(matches!(err, EpiFigError::Retrieval { .. }));
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_feature_set("<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, EpiFigError::Retrieval { .. }));
    }

    #[test]
    fn test_parse_feature_without_attributes() {
        assert!(parse_feature_set(r#"{"features": [{"geometry": null}]}"#).is_err());
    }

    #[test]
    fn test_parse_truncated_result_still_returns_records() {
        let body = r#"{"exceededTransferLimit": true, "features": [{"attributes": {"a": 1}}]}"#;
        assert_eq!(parse_feature_set(body).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_retrieval_error() {
        let mut config = ApiConfig {
            timeout_secs: 1,
            max_retries: 0,
            ..ApiConfig::default()
        };
        config.endpoints.key_data = "http://127.0.0.1:9/query".to_string();
        let client = ArcGisClient::new(config).unwrap();

        let err = client
            .fetch(Endpoint::KeyData, &QueryParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EpiFigError::Retrieval { .. }));
    }
}
