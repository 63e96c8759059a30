use crate::domain::business::RankedBusiness;
use serde::{Deserialize, Serialize};

/// Lowercased and trimmed form used to key snapshots.
pub fn normalize_term(s: &str) -> String {
    s.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSnapshot {
    pub id: String,
    pub keyword: String,
    pub location: String,
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub businesses: Vec<RankedBusiness>,
}

impl RankingSnapshot {
    pub fn matches(&self, keyword: &str, location: &str) -> bool {
        self.keyword == keyword && self.location == location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Same,
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingComparison {
    pub business_id: String,
    pub business_name: String,
    pub previous_rank: Option<u32>,
    pub current_rank: u32,
    /// `previous_rank - current_rank`; positive means the business moved up.
    pub rank_change: i64,
    pub trend: Trend,
}
