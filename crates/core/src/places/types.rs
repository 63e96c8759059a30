use crate::domain::business::Place;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSearchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Vec<TextSearchPlace>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSearchPlace {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

impl From<TextSearchPlace> for Place {
    fn from(p: TextSearchPlace) -> Self {
        Self {
            id: p.place_id,
            name: p.name,
            address: p.formatted_address,
            rating: p.rating,
            total_ratings: p.user_ratings_total,
            price_level: p.price_level,
            types: p.types,
            is_open: p.opening_hours.and_then(|h| h.open_now),
        }
    }
}
