use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::models::ChartFrame;
use crate::utils::errors::ChartError;

const DEFAULT_OUTPUT_DIR: &str = "charts";

/// Image format written by `$chart`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(ChartError::Config(format!(
                "CHART_FORMAT must be png or svg, got '{}'",
                other
            ))),
        }
    }
}

/// Runtime settings for the shell, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub frame: ChartFrame,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame: ChartFrame::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::default(),
            catalog_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ChartError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChartError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = ChartFrame::default();

        let frame = ChartFrame {
            width: parse_dimension("CHART_WIDTH", get("CHART_WIDTH"), defaults.width)?,
            height: parse_dimension("CHART_HEIGHT", get("CHART_HEIGHT"), defaults.height)?,
            padding: parse_dimension("CHART_PADDING", get("CHART_PADDING"), defaults.padding)?,
        };

        if frame.padding * 2.0 >= frame.width || frame.padding * 2.0 >= frame.height {
            return Err(ChartError::Config(format!(
                "CHART_PADDING {} leaves no room in a {}x{} frame",
                frame.padding, frame.width, frame.height
            )));
        }

        let format = match get("CHART_FORMAT") {
            Some(raw) => raw.parse()?,
            None => OutputFormat::default(),
        };

        let config = Self {
            frame,
            output_dir: get("CHART_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            format,
            catalog_path: get("COIN_CATALOG_PATH").map(PathBuf::from),
        };

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }
}

fn parse_dimension(key: &str, raw: Option<String>, default: f64) -> Result<f64, ChartError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(default),
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ChartError::Config(format!(
            "{} must be a non-negative number, got '{}'",
            key, raw
        ))),
    }
}
