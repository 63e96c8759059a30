use crate::config::Settings;
use crate::domain::business::Place;
use crate::error::{RankError, Result};
use crate::places::types::TextSearchResponse;
use crate::places::{search_query, PlacesProvider, GOOGLE_PLACES};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";

#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .places_api_key
            .clone()
            .ok_or_else(|| RankError::configuration("Google Places API key not configured"))?;

        let base_url = settings
            .places_base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = settings.places_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                RankError::configuration(format!("failed to build places http client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), TEXT_SEARCH_PATH)
    }
}

#[async_trait::async_trait]
impl PlacesProvider for GooglePlacesClient {
    fn provider_name(&self) -> &'static str {
        "google_places"
    }

    async fn search(&self, keyword: &str, location: &str) -> Result<Vec<Place>> {
        let query = search_query(keyword, location);

        let res = self
            .http
            .get(self.url())
            .query(&[("query", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let http_status = res.status();
        let text = res.text().await?;
        tracing::debug!(%query, %http_status, bytes = text.len(), "places text search");

        parse_text_search(http_status, &text)
    }
}

fn parse_text_search(http_status: reqwest::StatusCode, text: &str) -> Result<Vec<Place>> {
    let parsed = match serde_json::from_str::<TextSearchResponse>(text) {
        Ok(parsed) => parsed,
        Err(_) if !http_status.is_success() => {
            return Err(RankError::Provider {
                provider: GOOGLE_PLACES,
                status: format!("HTTP {http_status}"),
            })
        }
        Err(e) => {
            return Err(RankError::transport(format!(
                "places response is not valid JSON: {e}"
            )))
        }
    };

    if parsed.status != "OK" {
        if let Some(msg) = parsed.error_message.as_deref() {
            tracing::warn!(status = %parsed.status, error_message = %msg, "places search rejected");
        }
        let status = if parsed.status.is_empty() {
            format!("HTTP {http_status}")
        } else {
            parsed.status
        };
        return Err(RankError::Provider {
            provider: GOOGLE_PLACES,
            status,
        });
    }

    Ok(parsed.results.into_iter().map(Place::from).collect())
}
