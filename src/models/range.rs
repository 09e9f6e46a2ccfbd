//! Time range catalogue models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::utils::errors::ChartError;

pub const MS_PER_HOUR: i64 = 60 * 60 * 1000;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
pub const MS_PER_YEAR: i64 = 365 * MS_PER_DAY;

/// A named chart horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "7D")]
    SevenDays,
    #[serde(rename = "30D")]
    ThirtyDays,
    #[serde(rename = "90D")]
    NinetyDays,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    pub const ALL_RANGES: [TimeRange; 6] = [
        TimeRange::OneDay,
        TimeRange::SevenDays,
        TimeRange::ThirtyDays,
        TimeRange::NinetyDays,
        TimeRange::OneYear,
        TimeRange::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::SevenDays => "7D",
            TimeRange::ThirtyDays => "30D",
            TimeRange::NinetyDays => "90D",
            TimeRange::OneYear => "1Y",
            TimeRange::All => "ALL",
        }
    }

    /// Human readable caption, e.g. "7 day"
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1 day",
            TimeRange::SevenDays => "7 day",
            TimeRange::ThirtyDays => "30 day",
            TimeRange::NinetyDays => "90 day",
            TimeRange::OneYear => "1 year",
            TimeRange::All => "All time",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1D" => Ok(TimeRange::OneDay),
            "7D" => Ok(TimeRange::SevenDays),
            "30D" => Ok(TimeRange::ThirtyDays),
            "90D" => Ok(TimeRange::NinetyDays),
            "1Y" => Ok(TimeRange::OneYear),
            "ALL" => Ok(TimeRange::All),
            _ => Err(ChartError::UnknownRange(s.to_string())),
        }
    }
}

/// Date display granularity for generated labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFormat {
    /// `3:05 PM`
    Time,
    /// `Mar 5, 3 PM`
    DayHour,
    /// `Mar 5`
    Day,
    /// `Mar 24`
    MonthYear,
}

impl LabelFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            LabelFormat::Time => "%-I:%M %p",
            LabelFormat::DayHour => "%b %-d, %-I %p",
            LabelFormat::Day => "%b %-d",
            LabelFormat::MonthYear => "%b %y",
        }
    }

    pub fn format(&self, timestamp: DateTime<Utc>) -> String {
        timestamp.format(self.pattern()).to_string()
    }
}

/// Generation parameters for one range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub points: usize,
    pub duration_ms: i64,
    pub label_format: LabelFormat,
    pub volatility: f64,
}

impl RangeConfig {
    pub fn new(
        points: usize,
        duration_ms: i64,
        label_format: LabelFormat,
        volatility: f64,
    ) -> Result<Self, ChartError> {
        if points < 2 {
            return Err(ChartError::InvalidRange(format!("points must be at least 2, got {}", points)));
        }
        if duration_ms <= 0 {
            return Err(ChartError::InvalidRange(format!("duration must be positive, got {}ms", duration_ms)));
        }
        if !(volatility > 0.0 && volatility < 1.0) {
            return Err(ChartError::InvalidRange(format!("volatility must be in (0, 1), got {}", volatility)));
        }
        Ok(Self {
            points,
            duration_ms,
            label_format,
            volatility,
        })
    }
}

lazy_static! {
    static ref STANDARD_RANGES: RangeCatalog = RangeCatalog {
        entries: vec![
            (TimeRange::OneDay, RangeConfig { points: 24, duration_ms: MS_PER_DAY, label_format: LabelFormat::Time, volatility: 0.005 }),
            (TimeRange::SevenDays, RangeConfig { points: 36, duration_ms: 7 * MS_PER_DAY, label_format: LabelFormat::DayHour, volatility: 0.01 }),
            (TimeRange::ThirtyDays, RangeConfig { points: 30, duration_ms: 30 * MS_PER_DAY, label_format: LabelFormat::Day, volatility: 0.02 }),
            (TimeRange::NinetyDays, RangeConfig { points: 45, duration_ms: 90 * MS_PER_DAY, label_format: LabelFormat::Day, volatility: 0.03 }),
            (TimeRange::OneYear, RangeConfig { points: 52, duration_ms: MS_PER_YEAR, label_format: LabelFormat::MonthYear, volatility: 0.04 }),
            (TimeRange::All, RangeConfig { points: 60, duration_ms: 5 * MS_PER_YEAR, label_format: LabelFormat::MonthYear, volatility: 0.05 }),
        ],
    };
}

/// Ordered range table handed to the generators
///
/// The position of an entry is its ordinal, which decorrelates the noise of different
/// ranges for the same coin.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCatalog {
    entries: Vec<(TimeRange, RangeConfig)>,
}

impl RangeCatalog {
    /// Build a custom catalogue; later duplicates of a range are rejected
    pub fn new(entries: Vec<(TimeRange, RangeConfig)>) -> Result<Self, ChartError> {
        if entries.is_empty() {
            return Err(ChartError::InvalidRange("catalog has no ranges".to_string()));
        }
        for (i, (range, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(r, _)| r == range) {
                return Err(ChartError::InvalidRange(format!("duplicate range {}", range)));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in 1D/7D/30D/90D/1Y/ALL table
    pub fn standard() -> Self {
        STANDARD_RANGES.clone()
    }

    /// Ordinal and config for a range
    pub fn get(&self, range: TimeRange) -> Result<(usize, &RangeConfig), ChartError> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, (r, _))| *r == range)
            .map(|(ordinal, (_, config))| (ordinal, config))
            .ok_or_else(|| ChartError::UnknownRange(range.to_string()))
    }

    /// The entry with the longest simulated span
    pub fn longest(&self) -> (usize, TimeRange, &RangeConfig) {
        let mut best = 0;
        for (i, (_, config)) in self.entries.iter().enumerate() {
            if config.duration_ms > self.entries[best].1.duration_ms {
                best = i;
            }
        }
        let (range, config) = &self.entries[best];
        (best, *range, config)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(TimeRange, RangeConfig)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RangeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
