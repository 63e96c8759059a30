pub mod batch;
pub mod competitor;

use crate::analysis::rank::{analyze_business_keywords, KeywordRank, KeywordSummary};
use crate::config::{Pacing, Settings};
use crate::domain::business::{RankedBusiness, RankedPlace};
use crate::domain::history::RankingComparison;
use crate::error::{RankError, Result};
use crate::history::RankingHistory;
use crate::places::google::GooglePlacesClient;
use crate::places::PlacesProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub businesses: Vec<RankedPlace>,
    pub comparisons: Vec<RankingComparison>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub business: String,
    pub location: String,
    pub results: Vec<KeywordRank>,
    pub summary: KeywordSummary,
}

/// Entry point shared by the API and the worker.
#[derive(Clone)]
pub struct SearchService {
    // None when no provider credential is configured; searches then fail with Configuration.
    provider: Option<Arc<dyn PlacesProvider>>,
    history: RankingHistory,
    pacing: Pacing,
}

impl SearchService {
    pub fn new(
        provider: Option<Arc<dyn PlacesProvider>>,
        history: RankingHistory,
        pacing: Pacing,
    ) -> Self {
        Self {
            provider,
            history,
            pacing,
        }
    }

    /// Builds the Google Places client if a key is configured; a missing key is only an
    /// error once a search is attempted.
    pub fn from_settings(settings: &Settings, history: RankingHistory) -> Result<Self> {
        let provider = match settings.places_api_key {
            Some(_) => {
                let client: Arc<dyn PlacesProvider> =
                    Arc::new(GooglePlacesClient::from_settings(settings)?);
                Some(client)
            }
            None => {
                tracing::warn!("GOOGLE_PLACES_API_KEY missing; searches will be rejected");
                None
            }
        };
        Ok(Self::new(provider, history, settings.pacing))
    }

    pub fn history(&self) -> &RankingHistory {
        &self.history
    }

    fn provider(&self) -> Result<&dyn PlacesProvider> {
        self.provider
            .as_deref()
            .ok_or_else(|| RankError::configuration("Google Places API key not configured"))
    }

    /// Provider results for `keyword` in `location`, ranked by provider order.
    pub async fn search_places(&self, keyword: &str, location: &str) -> Result<Vec<RankedPlace>> {
        let keyword = keyword.trim();
        let location = location.trim();
        if keyword.is_empty() || location.is_empty() {
            return Err(RankError::validation("Keyword and location are required"));
        }

        let provider = self.provider()?;
        let places = provider.search(keyword, location).await.map_err(|err| {
            tracing::warn!(
                %keyword,
                %location,
                provider = provider.provider_name(),
                error = %err,
                "places search failed"
            );
            err
        })?;

        tracing::info!(%keyword, %location, results = places.len(), "places search");
        Ok(RankedPlace::rank_all(places))
    }

    pub async fn find_businesses(
        &self,
        keyword: &str,
        location: &str,
    ) -> Result<Vec<RankedBusiness>> {
        let places = self.search_places(keyword, location).await?;
        Ok(places.iter().map(RankedBusiness::from).collect())
    }

    /// Searches, records a snapshot when anything was found, and diffs it against the
    /// previous one. History writes are best-effort.
    pub async fn search_and_record(&self, keyword: &str, location: &str) -> Result<SearchOutcome> {
        let businesses = self.search_places(keyword, location).await?;
        if businesses.is_empty() {
            return Ok(SearchOutcome {
                businesses,
                comparisons: Vec::new(),
            });
        }

        let ranked: Vec<RankedBusiness> = businesses.iter().map(RankedBusiness::from).collect();
        if let Err(err) = self.history.save(keyword, location, &ranked).await {
            tracing::warn!(%keyword, %location, error = %err, "failed to record ranking snapshot");
        }
        let comparisons = self.history.comparisons(keyword, location).await;

        Ok(SearchOutcome {
            businesses,
            comparisons,
        })
    }

    pub async fn analyze_keywords(
        &self,
        name: &str,
        types: &[String],
        location: &str,
    ) -> Result<KeywordAnalysis> {
        let name = name.trim();
        let location = location.trim();
        if name.is_empty() || location.is_empty() {
            return Err(RankError::validation(
                "Business name and location are required",
            ));
        }

        let provider = self.provider()?;
        let results = analyze_business_keywords(
            provider,
            name,
            types,
            location,
            self.pacing.keyword_analysis,
        )
        .await;
        let summary = KeywordSummary::from_ranks(&results);

        Ok(KeywordAnalysis {
            business: name.to_string(),
            location: location.to_string(),
            results,
            summary,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::service_with;
    use super::*;
    use crate::domain::history::Trend;
    use crate::places::testing::{place, FakePlaces};
    use crate::storage::memory::MemoryBlobStore;

    #[tokio::test]
    async fn rejects_blank_keyword_or_location_before_calling_provider() {
        let (service, provider) = service_with(FakePlaces::new(), Pacing::none());

        let err = service.find_businesses("  ", "Austin").await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        let err = service.find_businesses("pizza", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Keyword and location are required");
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_provider_is_configuration_error_after_validation() {
        let history = RankingHistory::new(Arc::new(MemoryBlobStore::new()));
        let service = SearchService::new(None, history, Pacing::none());

        let err = service.find_businesses("", "Austin").await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        let err = service.find_businesses("pizza", "Austin").await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[tokio::test]
    async fn find_businesses_ranks_in_provider_order() {
        let provider = FakePlaces::new().respond("pizza", "Austin", &["Tony's", "Sal's"]);
        let (service, provider) = service_with(provider, Pacing::none());

        let out = service.find_businesses(" pizza ", "Austin ").await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "Tony's");
        assert_eq!(out[1].rank, 2);
        assert_eq!(provider.calls()[0].keyword, "pizza");
    }

    #[tokio::test]
    async fn provider_errors_propagate_for_single_searches() {
        let provider = FakePlaces::new().fail("pizza", "Austin", "REQUEST_DENIED");
        let (service, _) = service_with(provider, Pacing::none());

        let err = service.search_and_record("pizza", "Austin").await.unwrap_err();
        assert_eq!(err.to_string(), "Google Places API error: REQUEST_DENIED");
        assert!(service.history().load_all().await.is_empty());
    }

    #[tokio::test]
    async fn search_and_record_builds_trend_across_searches() {
        let first = FakePlaces::new().respond_places(
            "pizza",
            "Austin",
            vec![place("b", "Sal's"), place("c", "Luigi's"), place("a", "Tony's")],
        );
        let (service, _) = service_with(first, Pacing::none());
        let out = service.search_and_record("pizza", "Austin").await.unwrap();
        assert_eq!(out.businesses.len(), 3);
        assert!(out.comparisons.is_empty());

        // Differently cased query against the same history with a reshuffled provider.
        let second: Arc<dyn PlacesProvider> = Arc::new(FakePlaces::new().respond_places(
            "Pizza",
            "austin",
            vec![place("a", "Tony's"), place("d", "New Slice")],
        ));
        let service = SearchService::new(Some(second), service.history().clone(), Pacing::none());
        let out = service.search_and_record("Pizza", "austin").await.unwrap();

        assert_eq!(out.comparisons.len(), 2);
        assert_eq!(out.comparisons[0].business_id, "a");
        assert_eq!(out.comparisons[0].previous_rank, Some(3));
        assert_eq!(out.comparisons[0].trend, Trend::Up);
        assert_eq!(out.comparisons[1].trend, Trend::New);
    }

    #[tokio::test]
    async fn empty_search_is_not_recorded() {
        let (service, _) = service_with(FakePlaces::new(), Pacing::none());
        let out = service.search_and_record("pizza", "Austin").await.unwrap();
        assert!(out.businesses.is_empty());
        assert!(service.history().load_all().await.is_empty());
    }

    #[tokio::test]
    async fn analyze_keywords_reports_summary() {
        let provider = FakePlaces::new()
            .respond("business", "Austin", &["Acme Corp"])
            .respond("company", "Austin", &["Zed", "Bo", "Cy", "Du", "Acme"]);
        let (service, _) = service_with(provider, Pacing::none());

        let analysis = service.analyze_keywords("Acme Corp", &[], "Austin").await.unwrap();
        assert_eq!(analysis.results.len(), 4);
        assert_eq!(analysis.summary.found, 2);
        assert_eq!(analysis.summary.top3, 1);
        assert_eq!(analysis.summary.top10, 1);
        assert_eq!(analysis.summary.not_found, 2);

        let err = service.analyze_keywords("", &[], "Austin").await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
