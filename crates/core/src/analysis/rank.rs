use crate::analysis::keywords::{detect_categories, related_keywords};
use crate::places::PlacesProvider;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

/// Case-insensitive containment in either direction.
///
/// Providers give no identifier that is stable across independent queries, so names are the
/// only correlation key. Overlapping names can mismatch ("Ace" matches "Ace Hardware Store").
pub fn names_match(candidate: &str, target: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let target = target.to_lowercase();
    candidate.contains(&target) || target.contains(&candidate)
}

/// 1-based rank of the first candidate whose name matches `target_name`.
pub fn lookup_rank<'a, I>(candidate_names: I, target_name: &str) -> Option<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    candidate_names
        .into_iter()
        .position(|name| names_match(name, target_name))
        .map(|idx| idx as u32 + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRank {
    pub keyword: String,
    pub rank: Option<u32>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl KeywordRank {
    fn found(keyword: String, rank: Option<u32>) -> Self {
        Self {
            keyword,
            found: rank.is_some(),
            rank,
            error: None,
        }
    }

    fn failed(keyword: String, error: String) -> Self {
        Self {
            keyword,
            rank: None,
            found: false,
            error: Some(error),
        }
    }
}

/// Found before not-found, then ascending rank; otherwise input order.
pub fn sort_keyword_ranks(results: &mut [KeywordRank]) {
    results.sort_by(|a, b| match (a.rank, b.rank) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSummary {
    pub found: usize,
    /// Ranks 1..=3.
    pub top3: usize,
    /// Ranks 4..=10.
    pub top10: usize,
    pub not_found: usize,
}

impl KeywordSummary {
    pub fn from_ranks(results: &[KeywordRank]) -> Self {
        let mut out = Self::default();
        for r in results {
            match r.rank {
                Some(rank) => {
                    out.found += 1;
                    if rank <= 3 {
                        out.top3 += 1;
                    } else if rank <= 10 {
                        out.top10 += 1;
                    }
                }
                None => out.not_found += 1,
            }
        }
        out
    }
}

/// Ranks `name` for each keyword related to its categories, one provider call at a time.
///
/// A failed lookup marks only that keyword as not found.
pub async fn analyze_business_keywords(
    provider: &dyn PlacesProvider,
    name: &str,
    types: &[String],
    location: &str,
    pause: Duration,
) -> Vec<KeywordRank> {
    let categories = detect_categories(types, name);
    let keywords = related_keywords(&categories);
    tracing::info!(
        business = %name,
        %location,
        ?categories,
        keywords = keywords.len(),
        "analyzing related keywords"
    );

    let mut results = Vec::with_capacity(keywords.len());
    for (idx, keyword) in keywords.into_iter().enumerate() {
        if idx != 0 {
            tokio::time::sleep(pause).await;
        }

        match provider.search(&keyword, location).await {
            Ok(places) => {
                let rank = lookup_rank(places.iter().map(|p| p.name.as_str()), name);
                results.push(KeywordRank::found(keyword, rank));
            }
            Err(err) => {
                tracing::warn!(%keyword, %location, error = %err, "keyword lookup failed");
                results.push(KeywordRank::failed(keyword, err.to_string()));
            }
        }
    }

    sort_keyword_ranks(&mut results);
    results
}
