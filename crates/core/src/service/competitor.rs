use crate::analysis::rank::lookup_rank;
use crate::domain::business::BusinessRef;
use crate::error::{RankError, Result};
use crate::service::batch::dedupe_terms;
use crate::service::SearchService;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_COMPETITORS: usize = 2;
pub const MAX_COMPETITORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorKeywordRow {
    pub keyword: String,
    /// Business id to 1-based rank, `None` when the business was not in the results.
    pub rankings: BTreeMap<String, Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl SearchService {
    /// Ranks each selected business for every keyword in one location.
    ///
    /// Keywords run one at a time; a failed keyword yields a row with no rankings and its error.
    pub async fn compare_competitors(
        &self,
        location: &str,
        businesses: &[BusinessRef],
        keywords: &[String],
    ) -> Result<Vec<CompetitorKeywordRow>> {
        let location = location.trim();
        let keywords = dedupe_terms(keywords);

        let mut selected: Vec<&BusinessRef> = Vec::with_capacity(businesses.len());
        for b in businesses {
            if !selected.iter().any(|s| s.id == b.id) {
                selected.push(b);
            }
        }

        if location.is_empty() {
            return Err(RankError::validation("Location is required"));
        }
        if !(MIN_COMPETITORS..=MAX_COMPETITORS).contains(&selected.len()) || keywords.is_empty() {
            return Err(RankError::validation(format!(
                "Please select {MIN_COMPETITORS} to {MAX_COMPETITORS} businesses and add at least 1 keyword"
            )));
        }
        self.provider()?;

        let mut out = Vec::with_capacity(keywords.len());
        for (idx, keyword) in keywords.into_iter().enumerate() {
            if idx != 0 {
                tokio::time::sleep(self.pacing.competitor).await;
            }

            match self.search_places(&keyword, location).await {
                Ok(places) => {
                    let rankings = selected
                        .iter()
                        .map(|b| {
                            let names = places.iter().map(|p| p.place.name.as_str());
                            (b.id.clone(), lookup_rank(names, &b.name))
                        })
                        .collect();
                    out.push(CompetitorKeywordRow {
                        keyword,
                        rankings,
                        error: None,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        %keyword,
                        %location,
                        error = %err,
                        "competitor keyword search failed"
                    );
                    out.push(CompetitorKeywordRow {
                        rankings: selected.iter().map(|b| (b.id.clone(), None)).collect(),
                        keyword,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(out)
    }
}
