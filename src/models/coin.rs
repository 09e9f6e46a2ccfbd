//! Coin catalogue models

use serde::{Deserialize, Serialize};

/// A coin as served by the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub change24h: f64,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default)]
    pub volume24h: f64,
    #[serde(default)]
    pub all_time_high: Option<f64>,
    #[serde(default)]
    pub all_time_low: Option<f64>,
}

impl Coin {
    /// Both all-time landmarks, when the catalogue knows them
    pub fn all_time_bounds(&self) -> Option<(f64, f64)> {
        match (self.all_time_high, self.all_time_low) {
            (Some(high), Some(low)) => Some((high, low)),
            _ => None,
        }
    }
}
