use thiserror::Error;

/// Errors raised by the series generators, geometry helpers and renderer
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Unknown time range: '{0}'. Supported: 1D, 7D, 30D, 90D, 1Y, ALL")]
    UnknownRange(String),
    #[error("Invalid range config: {0}")]
    InvalidRange(String),
    #[error("Invalid {field}: {value} (must be finite and at least 0.0001)")]
    InvalidPrice { field: &'static str, value: f64 },
    #[error("All-time low {low} is above all-time high {high}")]
    InvertedBounds { high: f64, low: f64 },
    #[error("Coin '{0}' not found")]
    UnknownCoin(String),
    #[error("Catalog error: {0}")]
    Catalog(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Render error: {0}")]
    Render(String),
}

/// Strip the variant prefix from an error so only the meaningful part reaches the user
///
/// "Render error: Failed to fill canvas" -> "Failed to fill canvas"
pub fn extract_clean_error(error_msg: &str) -> String {
    const PREFIXES: [&str; 4] = ["Render error: ", "I/O error: ", "Catalog error: ", "Config error: "];

    for prefix in PREFIXES {
        if let Some(rest) = error_msg.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    error_msg.to_string()
}
