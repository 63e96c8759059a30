use serde::{Deserialize, Serialize};

/// A single place as returned by the search provider, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub total_ratings: Option<u32>,
    pub price_level: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    pub is_open: Option<bool>,
}

/// A place together with its 1-based position in the provider's result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlace {
    pub rank: u32,
    #[serde(flatten)]
    pub place: Place,
}

impl RankedPlace {
    pub fn rank_all(places: Vec<Place>) -> Vec<Self> {
        places
            .into_iter()
            .enumerate()
            .map(|(idx, place)| Self {
                rank: idx as u32 + 1,
                place,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedBusiness {
    pub id: String,
    pub name: String,
    pub rank: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
}

impl From<&RankedPlace> for RankedBusiness {
    fn from(p: &RankedPlace) -> Self {
        Self {
            id: p.place.id.clone(),
            name: p.place.name.clone(),
            rank: p.rank,
            rating: p.place.rating.unwrap_or(0.0),
            total_ratings: p.place.total_ratings.unwrap_or(0),
        }
    }
}

/// A business picked for side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRef {
    pub id: String,
    pub name: String,
}
