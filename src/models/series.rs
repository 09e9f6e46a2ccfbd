//! Generated price series models

use serde::{Deserialize, Serialize};

/// Floor applied to every generated price so ratio math never sees zero or negatives
pub const MIN_PRICE: f64 = 0.0001;

/// One open/high/low/close candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcCandle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcCandle {
    pub fn is_rising(&self) -> bool {
        self.close >= self.open
    }
}

/// Close prices, display labels and derived candles of one generation call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSeries {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    #[serde(rename = "ohlcData")]
    pub ohlc: Vec<OhlcCandle>,
}

impl GeneratedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last close, which generators pin to the real current price
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}
