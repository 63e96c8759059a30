use crate::domain::business::RankedPlace;
use crate::error::{RankError, Result};
use crate::service::SearchService;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    pub location: String,
    pub businesses: Vec<RankedPlace>,
    pub top_business: Option<RankedPlace>,
    pub average_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl LocationResult {
    fn ok(location: String, businesses: Vec<RankedPlace>) -> Self {
        Self {
            top_business: businesses.first().cloned(),
            average_rating: average_rating(&businesses),
            location,
            businesses,
            error: None,
        }
    }

    fn failed(location: String, error: String) -> Self {
        Self {
            location,
            businesses: Vec::new(),
            top_business: None,
            average_rating: 0.0,
            error: Some(error),
        }
    }
}

/// Mean rating rounded to one decimal; unrated places count as 0.
pub fn average_rating(businesses: &[RankedPlace]) -> f64 {
    if businesses.is_empty() {
        return 0.0;
    }
    let sum: f64 = businesses
        .iter()
        .map(|b| b.place.rating.unwrap_or(0.0))
        .sum();
    (sum / businesses.len() as f64 * 10.0).round() / 10.0
}

/// Trimmed, non-empty, first occurrence wins.
pub fn dedupe_terms(terms: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim();
        if !term.is_empty() && !out.iter().any(|t| t == term) {
            out.push(term.to_string());
        }
    }
    out
}

impl SearchService {
    /// Searches one keyword across several locations, one call at a time.
    ///
    /// Per-location failures are reported in that location's result. Nothing is recorded.
    pub async fn batch_locations(
        &self,
        keyword: &str,
        locations: &[String],
    ) -> Result<Vec<LocationResult>> {
        let keyword = keyword.trim();
        let locations = dedupe_terms(locations);
        if keyword.is_empty() || locations.is_empty() {
            return Err(RankError::validation(
                "Please enter a keyword and add at least one location",
            ));
        }
        self.provider()?;

        let total = locations.len();
        let mut out = Vec::with_capacity(total);
        for (idx, location) in locations.into_iter().enumerate() {
            if idx != 0 {
                tokio::time::sleep(self.pacing.batch_location).await;
            }

            match self.search_places(keyword, &location).await {
                Ok(businesses) => out.push(LocationResult::ok(location, businesses)),
                Err(err) => {
                    tracing::warn!(
                        idx,
                        %keyword,
                        %location,
                        error = %err,
                        "batch location search failed"
                    );
                    out.push(LocationResult::failed(location, err.to_string()));
                }
            }

            tracing::debug!(processed = idx + 1, total, %keyword, "batch location progress");
        }

        Ok(out)
    }
}
