use crate::domain::history::{normalize_term, RankingComparison, RankingSnapshot, Trend};

/// Diffs the two most recent snapshots for `(keyword, location)`.
///
/// Empty when fewer than two snapshots match. Only businesses in the newer snapshot are
/// reported; ones that dropped out of the results entirely are not listed.
pub fn compare(log: &[RankingSnapshot], keyword: &str, location: &str) -> Vec<RankingComparison> {
    let keyword = normalize_term(keyword);
    let location = normalize_term(location);

    let mut matching: Vec<&RankingSnapshot> =
        log.iter().filter(|s| s.matches(&keyword, &location)).collect();
    if matching.len() < 2 {
        return Vec::new();
    }
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    diff_snapshots(matching[1], matching[0])
}

pub fn diff_snapshots(
    previous: &RankingSnapshot,
    current: &RankingSnapshot,
) -> Vec<RankingComparison> {
    let mut out: Vec<RankingComparison> = current
        .businesses
        .iter()
        .map(|cur| {
            let prev = previous.businesses.iter().find(|b| b.id == cur.id);
            let (previous_rank, rank_change, trend) = match prev {
                None => (None, 0, Trend::New),
                Some(prev) => {
                    let change = i64::from(prev.rank) - i64::from(cur.rank);
                    let trend = match change {
                        c if c > 0 => Trend::Up,
                        c if c < 0 => Trend::Down,
                        _ => Trend::Same,
                    };
                    (Some(prev.rank), change, trend)
                }
            };

            RankingComparison {
                business_id: cur.id.clone(),
                business_name: cur.name.clone(),
                previous_rank,
                current_rank: cur.rank,
                rank_change,
                trend,
            }
        })
        .collect();

    out.sort_by_key(|c| c.current_rank);
    out
}
