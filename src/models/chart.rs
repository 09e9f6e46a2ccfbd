//! Chart geometry models
//!
//! Everything here is in logical frame units. A renderer maps the frame onto its own
//! surface; the pointer helpers map a surface coordinate back into the frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const CHART_WIDTH: f64 = 720.0;
pub const CHART_HEIGHT: f64 = 320.0;
pub const CHART_PADDING: f64 = 28.0;

/// Line or candlestick rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    Line,
    Candle,
}

impl ChartMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMode::Line => "line",
            ChartMode::Candle => "candle",
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(ChartMode::Line),
            "candle" | "candles" | "candlestick" => Ok(ChartMode::Candle),
            _ => Err(format!("Unknown chart mode: '{}'. Use: line, candle", s)),
        }
    }
}

/// Drawing frame dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            padding: CHART_PADDING,
        }
    }
}

/// Frame plus its inner plotting area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub inner_w: f64,
    pub inner_h: f64,
}

impl ChartGeometry {
    /// Y of the plot baseline
    pub fn baseline(&self) -> f64 {
        self.height - self.padding
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// Vertical extent of what is being drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub high: f64,
    pub low: f64,
    /// `high - low`, or 1 when that is zero
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineGeometry {
    pub points: Vec<ChartPoint>,
    /// `x,y` pairs joined by spaces
    pub polyline: String,
    /// Closed path from the baseline up through the line and back down
    pub area_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleGeometry {
    pub count: usize,
    pub step: f64,
    pub body_width: f64,
    pub low: f64,
    pub price_range: f64,
    pub baseline: f64,
    pub inner_h: f64,
    pub padding: f64,
}

impl CandleGeometry {
    pub fn scale_y(&self, value: f64) -> f64 {
        self.baseline - ((value - self.low) / self.price_range) * self.inner_h
    }

    /// The value to pixel-Y mapping as a standalone closure
    pub fn scaler(&self) -> impl Fn(f64) -> f64 {
        let geometry = *self;
        move |value| geometry.scale_y(value)
    }

    /// Horizontal center of candle `index`
    pub fn center_x(&self, index: usize) -> f64 {
        self.padding + (index as f64 + 0.5) * self.step
    }
}

/// Pixel boxes for one candle: a wick spanning high..low and a body spanning open..close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleBox {
    pub center_x: f64,
    pub body_x: f64,
    pub body_y: f64,
    pub body_width: f64,
    pub body_height: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub rising: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TooltipPosition {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}
