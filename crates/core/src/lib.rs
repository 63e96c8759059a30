pub mod analysis;
pub mod domain;
pub mod error;
pub mod history;
pub mod places;
pub mod service;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    const DEFAULT_HISTORY_DIR: &str = ".rankwatch";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub places_api_key: Option<String>,
        pub places_base_url: Option<String>,
        pub places_timeout_secs: Option<u64>,
        pub history_dir: Option<String>,
        pub pacing: Pacing,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                places_api_key: std::env::var("GOOGLE_PLACES_API_KEY")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                places_base_url: std::env::var("PLACES_BASE_URL").ok(),
                places_timeout_secs: env_parse("PLACES_TIMEOUT_SECS"),
                history_dir: std::env::var("HISTORY_DIR")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                pacing: Pacing::from_env(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_places_api_key(&self) -> anyhow::Result<&str> {
            self.places_api_key
                .as_deref()
                .context("GOOGLE_PLACES_API_KEY is required")
        }

        pub fn history_dir(&self) -> PathBuf {
            PathBuf::from(self.history_dir.as_deref().unwrap_or(DEFAULT_HISTORY_DIR))
        }
    }

    /// Fixed pauses between sequential provider calls in multi-call operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Pacing {
        pub batch_location: Duration,
        pub competitor: Duration,
        pub keyword_analysis: Duration,
    }

    impl Default for Pacing {
        fn default() -> Self {
            Self {
                batch_location: Duration::from_millis(500),
                competitor: Duration::from_millis(300),
                keyword_analysis: Duration::from_millis(200),
            }
        }
    }

    impl Pacing {
        pub fn from_env() -> Self {
            let mut out = Self::default();

            if let Some(ms) = env_parse::<u64>("BATCH_LOCATION_DELAY_MS") {
                out.batch_location = Duration::from_millis(ms);
            }
            if let Some(ms) = env_parse::<u64>("COMPETITOR_DELAY_MS") {
                out.competitor = Duration::from_millis(ms);
            }
            if let Some(ms) = env_parse::<u64>("KEYWORD_ANALYSIS_DELAY_MS") {
                out.keyword_analysis = Duration::from_millis(ms);
            }

            out
        }

        pub fn none() -> Self {
            Self {
                batch_location: Duration::ZERO,
                competitor: Duration::ZERO,
                keyword_analysis: Duration::ZERO,
            }
        }
    }

    fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
    }

}
