pub mod google;
pub mod types;

use crate::domain::business::Place;
use crate::error::Result;

pub const GOOGLE_PLACES: &str = "Google Places API";

/// Text query sent to the provider for a keyword/location pair.
pub fn search_query(keyword: &str, location: &str) -> String {
    format!("{} {}", keyword.trim(), location.trim())
}

#[async_trait::async_trait]
pub trait PlacesProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Places in provider order. Non-OK provider status is `RankError::Provider`.
    async fn search(&self, keyword: &str, location: &str) -> Result<Vec<Place>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::RankError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct Call {
        pub keyword: String,
        pub location: String,
        pub at: tokio::time::Instant,
    }

    /// Scripted provider keyed by `search_query`; unscripted queries return no places.
    #[derive(Debug, Default)]
    pub struct FakePlaces {
        responses: Mutex<HashMap<String, std::result::Result<Vec<Place>, String>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakePlaces {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, keyword: &str, location: &str, names: &[&str]) -> Self {
            let places = names
                .iter()
                .enumerate()
                .map(|(i, name)| place(&format!("{}-{i}", slug(name)), name))
                .collect();
            self.respond_places(keyword, location, places)
        }

        pub fn respond_places(self, keyword: &str, location: &str, places: Vec<Place>) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(search_query(keyword, location), Ok(places));
            self
        }

        pub fn fail(self, keyword: &str, location: &str, status: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(search_query(keyword, location), Err(status.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl PlacesProvider for FakePlaces {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn search(&self, keyword: &str, location: &str) -> Result<Vec<Place>> {
            self.calls.lock().unwrap().push(Call {
                keyword: keyword.to_string(),
                location: location.to_string(),
                at: tokio::time::Instant::now(),
            });
            let scripted = self
                .responses
                .lock()
                .unwrap()
                .get(&search_query(keyword, location))
                .cloned();
            // Yield so overlapping calls would be observable.
            tokio::task::yield_now().await;
            match scripted {
                Some(Ok(places)) => Ok(places),
                Some(Err(status)) => Err(RankError::Provider {
                    provider: GOOGLE_PLACES,
                    status,
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    pub fn place(id: &str, name: &str) -> Place {
        Place {
            id: id.to_string(),
            name: name.to_string(),
            address: None,
            rating: Some(4.0),
            total_ratings: Some(10),
            price_level: None,
            types: vec![],
            is_open: None,
        }
    }

    fn slug(name: &str) -> String {
        name.to_lowercase().replace(' ', "-")
    }
}
