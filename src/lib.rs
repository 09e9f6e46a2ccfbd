//! CoinSight chart engine
//!
//! Deterministic synthetic price history for catalogue coins plus the geometry needed to draw
//! it as a line or candlestick chart. The generators are seeded from the coin id, so the same
//! coin and range always produce the same series for a given `now`.

pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{AppConfig, OutputFormat};
pub use models::{ChartFrame, ChartMode, GeneratedSeries, OhlcCandle, RangeCatalog, TimeRange};
pub use services::catalog_service::CoinCatalog;
pub use services::chart_service::ChartLayout;
pub use services::series_service::{generate_all_time_series, generate_range_series};
pub use utils::errors::ChartError;
