use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::{PlaceCandidate, PlaceSearch};
use crate::PlannerError;
use crate::config::PlacesConfig;

/// Google Places text-search client
pub struct GooglePlacesClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

/// Text-search response body
#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    results: Vec<PlaceCandidate>,
}

impl GooglePlacesClient {
    /// Create a client from configuration, failing when no API key is set
    pub fn from_config(config: &PlacesConfig) -> crate::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                PlannerError::not_configured("Place search", "no Google Maps API key")
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("travelplanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlannerError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/textsearch/json?query={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        )
    }

    /// The request URL carries the API key; keep it out of error text and logs
    fn redact(&self, message: &str) -> String {
        message
            .replace(urlencoding::encode(&self.api_key).as_ref(), "REDACTED")
            .replace(&self.api_key, "REDACTED")
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> crate::Result<Vec<PlaceCandidate>> {
        debug!("Searching Google Places");

        let response = self
            .client
            .get(self.search_url(query))
            .send()
            .await
            .map_err(|e| {
                let detail = match e {
                    reqwest_middleware::Error::Reqwest(e) => e.without_url().to_string(),
                    other => other.to_string(),
                };
                PlannerError::upstream(format!(
                    "Place search request failed: {}",
                    self.redact(&detail)
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlannerError::upstream(format!(
                "Place search returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| {
                PlannerError::upstream(format!(
                    "Failed to read place search body: {}",
                    e.without_url()
                ))
            })?;

        let candidates = parse_text_search(&body)?;
        info!("Found {} places for '{}'", candidates.len(), query);
        Ok(candidates)
    }
}

/// Parse a text-search body, rejecting provider-reported errors
fn parse_text_search(body: &str) -> crate::Result<Vec<PlaceCandidate>> {
    let response: TextSearchResponse = serde_json::from_str(body)
        .map_err(|e| PlannerError::upstream(format!("Failed to parse place search response: {e}")))?;

    match response.status.as_deref() {
        None | Some("OK" | "ZERO_RESULTS") => Ok(response.results),
        Some(status) => Err(PlannerError::upstream(format!(
            "Place search status {status}: {}",
            response.error_message.unwrap_or_default()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;

    #[test]
    fn test_parse_results() {
        let body = r#"{
            "status": "OK",
            "results": [
                {"name": "Hotel Lutetia", "formatted_address": "45 Bd Raspail, Paris", "rating": 4.6, "place_id": "x"},
                {"name": "Le Bristol"}
            ]
        }"#;
        let candidates = parse_text_search(body).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].rating, Some(4.6));
        assert_eq!(candidates[1].formatted_address, None);
    }

    #[test]
    fn test_parse_zero_results() {
        let body = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        assert!(parse_text_search(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_denied_is_error() {
        let body = r#"{"status": "REQUEST_DENIED", "error_message": "bad key", "results": []}"#;
        let err = parse_text_search(body).unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn test_parse_malformed_is_error() {
        assert!(parse_text_search(r#"{"results": "nope"}"#).is_err());
        assert!(parse_text_search("<html>").is_err());
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = PlannerConfig::default();
        let err = GooglePlacesClient::from_config(&config.places).err().unwrap();
        assert!(matches!(err, PlannerError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let config = PlacesConfig {
            api_key: Some("SECRETKEY123".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            max_retries: 0,
            ..PlacesConfig::default()
        };
        let client = GooglePlacesClient::from_config(&config).unwrap();

        let err = client.search("hotels in Paris").await.unwrap_err();
        assert!(matches!(err, PlannerError::Upstream { .. }));
        assert!(!err.to_string().contains("SECRETKEY123"), "{err}");
    }

    #[test]
    fn test_redact_removes_raw_and_encoded_key() {
        let mut config = PlannerConfig::default();
        config.places.api_key = Some("key&1".to_string());
        let client = GooglePlacesClient::from_config(&config.places).unwrap();
        assert_eq!(
            client.redact("url (http://x/json?query=a&key=key%261) or key&1"),
            "url (http://x/json?query=a&key=REDACTED) or REDACTED"
        );
    }

    #[test]
    fn test_search_url_encodes_query() {
        let mut config = PlannerConfig::default();
        config.places.api_key = Some("key&1".to_string());
        let client = GooglePlacesClient::from_config(&config.places).unwrap();
        assert_eq!(
            client.search_url("hotels in São Paulo"),
            "https://maps.googleapis.com/maps/api/place/textsearch/json?query=hotels%20in%20S%C3%A3o%20Paulo&key=key%261"
        );
    }
}
