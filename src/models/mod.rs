//! Data models for the CoinSight chart engine
//!
//! Range catalogue, generated series, chart geometry and catalogue coins. Everything here is
//! plain data; the services produce and consume it.

pub mod chart;
pub mod coin;
pub mod range;
pub mod series;

// Re-export commonly used types for convenience
pub use chart::{
    CandleBox, CandleGeometry, ChartFrame, ChartGeometry, ChartMode, ChartPoint, LineGeometry,
    PriceBounds, TooltipPosition,
};
pub use coin::Coin;
pub use range::{LabelFormat, RangeCatalog, RangeConfig, TimeRange};
pub use series::{GeneratedSeries, OhlcCandle, MIN_PRICE};
