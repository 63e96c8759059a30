use crate::domain::history::RankingSnapshot;
use serde::{Deserialize, Serialize};

pub const HISTORY_BLOB_KEY: &str = "business-ranking-history";
pub const LOG_VERSION: u32 = 1;
pub const MAX_SNAPSHOTS: usize = 100;

#[derive(Debug, Serialize, Deserialize)]
struct VersionedLog {
    version: u32,
    snapshots: Vec<RankingSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredLog {
    Versioned(VersionedLog),
    // Unversioned layout: a bare array of snapshots.
    Legacy(Vec<RankingSnapshot>),
}

pub fn encode(snapshots: &[RankingSnapshot]) -> anyhow::Result<String> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        version: u32,
        snapshots: &'a [RankingSnapshot],
    }

    Ok(serde_json::to_string(&Borrowed {
        version: LOG_VERSION,
        snapshots,
    })?)
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed history log: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported history log version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Deserialize)]
struct VersionTag {
    version: u32,
}

/// Newer versions are rejected before their snapshots are parsed, since their layout may differ.
pub fn decode(payload: &str) -> Result<Vec<RankingSnapshot>, DecodeError> {
    if let Ok(VersionTag { version }) = serde_json::from_str::<VersionTag>(payload) {
        if version > LOG_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
    }

    match serde_json::from_str::<StoredLog>(payload)? {
        StoredLog::Legacy(snapshots) => Ok(snapshots),
        StoredLog::Versioned(log) => Ok(log.snapshots),
    }
}

/// Drops the oldest entries so at most `MAX_SNAPSHOTS` remain.
pub fn evict_oldest(snapshots: &mut Vec<RankingSnapshot>) {
    if snapshots.len() > MAX_SNAPSHOTS {
        let excess = snapshots.len() - MAX_SNAPSHOTS;
        snapshots.drain(..excess);
    }
}
