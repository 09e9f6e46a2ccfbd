use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::models::Coin;
use crate::utils::errors::ChartError;

const BUILTIN_COINS: &str = include_str!("../../data/coins.json");

/// An ordered list of coins the shell can chart
#[derive(Debug, Clone)]
pub struct CoinCatalog {
    coins: Vec<Coin>,
}

impl CoinCatalog {
    /// The catalogue bundled with the crate
    pub fn builtin() -> Result<Self, ChartError> {
        Self::from_json(BUILTIN_COINS)
    }

    /// Load a catalogue with the same JSON shape from disk
    pub fn from_path(path: &Path) -> Result<Self, ChartError> {
        let raw = fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        info!("Loaded {} coins from {}", catalog.coins.len(), path.display());
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, ChartError> {
        let coins: Vec<Coin> = serde_json::from_str(raw)?;
        debug!("Parsed coin catalogue with {} entries", coins.len());
        Ok(Self { coins })
    }

    /// Look a coin up by id or symbol, ignoring case
    pub fn find(&self, key: &str) -> Result<&Coin, ChartError> {
        let key = key.trim();
        self.coins
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(key) || c.symbol.eq_ignore_ascii_case(key))
            .ok_or_else(|| ChartError::UnknownCoin(key.to_string()))
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}
