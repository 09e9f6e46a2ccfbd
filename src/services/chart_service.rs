use tracing::debug;

use crate::models::{
    CandleBox, CandleGeometry, ChartFrame, ChartGeometry, ChartMode, ChartPoint, GeneratedSeries,
    LineGeometry, OhlcCandle, PriceBounds, TooltipPosition,
};

/// Tooltip box sizes (width, height) per mode
pub const LINE_TOOLTIP: (f64, f64) = (160.0, 48.0);
pub const CANDLE_TOOLTIP: (f64, f64) = (170.0, 100.0);
/// Horizontal gap between anchor and tooltip
pub const TOOLTIP_MARGIN: f64 = 10.0;
/// Vertical gap between tooltip bottom and anchor
pub const TOOLTIP_LIFT: f64 = 12.0;
/// Candle body as a share of its horizontal step
pub const BODY_RATIO: f64 = 0.6;
/// Number of horizontal grid rules
pub const GRID_LINES: usize = 4;

/// Frame dimensions plus the inner plotting area
pub fn chart_geometry(frame: &ChartFrame) -> ChartGeometry {
    ChartGeometry {
        width: frame.width,
        height: frame.height,
        padding: frame.padding,
        inner_w: frame.width - frame.padding * 2.0,
        inner_h: frame.height - frame.padding * 2.0,
    }
}

fn min_max<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// A range of zero would collapse the chart onto one pixel row
fn nonzero_range(range: f64) -> f64 {
    if range == 0.0 || range.is_nan() {
        1.0
    } else {
        range
    }
}

/// Map a series into frame coordinates
///
/// Index spreads linearly across the inner width, value across the inner height. `bounds`
/// overrides the series' own `(min, max)` when several series share one frame.
pub fn to_points(values: &[f64], geometry: &ChartGeometry, bounds: Option<(f64, f64)>) -> Vec<ChartPoint> {
    let (min, max) = match bounds.or_else(|| min_max(values.iter().copied())) {
        Some(b) => b,
        None => return Vec::new(),
    };
    let range = nonzero_range(max - min);
    let last_index = values.len().saturating_sub(1).max(1) as f64;

    values
        .iter()
        .enumerate()
        .map(|(index, value)| ChartPoint {
            x: geometry.padding + (index as f64 / last_index) * geometry.inner_w,
            y: geometry.height - geometry.padding - ((value - min) / range) * geometry.inner_h,
        })
        .collect()
}

/// Whether candles will actually be drawn: candle mode needs candle data
pub fn is_candle_mode(mode: ChartMode, ohlc: &[OhlcCandle]) -> bool {
    mode == ChartMode::Candle && !ohlc.is_empty()
}

/// High and low of what is drawn: candle wicks in candle mode, closes otherwise
pub fn high_low(mode: ChartMode, values: &[f64], ohlc: &[OhlcCandle]) -> PriceBounds {
    let extent = if is_candle_mode(mode, ohlc) {
        min_max(ohlc.iter().map(|c| c.low))
            .zip(min_max(ohlc.iter().map(|c| c.high)))
            .map(|((low, _), (_, high))| (low, high))
    } else {
        min_max(values.iter().copied())
    };
    let (low, high) = extent.unwrap_or((0.0, 0.0));

    PriceBounds {
        high,
        low,
        range: nonzero_range(high - low),
    }
}

/// Polyline and area-fill geometry for the line chart; empty in candle mode
pub fn line_geometry(
    values: &[f64],
    geometry: &ChartGeometry,
    candle_mode: bool,
    bounds: Option<(f64, f64)>,
) -> LineGeometry {
    if candle_mode {
        return LineGeometry::default();
    }

    let points = to_points(values, geometry, bounds);
    let polyline = points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");
    let area_path = match (points.first(), points.last()) {
        (Some(first), Some(last)) => format!(
            "M {} {} L {} L {} {} Z",
            first.x,
            geometry.baseline(),
            polyline,
            last.x,
            geometry.baseline()
        ),
        _ => String::new(),
    };

    LineGeometry {
        points,
        polyline,
        area_path,
    }
}

/// Per-candle step, body width and the value scale
pub fn candle_geometry(
    ohlc: &[OhlcCandle],
    geometry: &ChartGeometry,
    bounds: &PriceBounds,
    candle_mode: bool,
) -> CandleGeometry {
    let count = if candle_mode { ohlc.len() } else { 0 };
    let step = if count > 0 { geometry.inner_w / count as f64 } else { 0.0 };

    CandleGeometry {
        count,
        step,
        body_width: step * BODY_RATIO,
        low: bounds.low,
        price_range: bounds.range,
        baseline: geometry.baseline(),
        inner_h: geometry.inner_h,
        padding: geometry.padding,
    }
}

/// Wick and body boxes for every candle
pub fn candle_boxes(ohlc: &[OhlcCandle], candles: &CandleGeometry) -> Vec<CandleBox> {
    ohlc.iter()
        .take(candles.count)
        .enumerate()
        .map(|(i, candle)| {
            let center_x = candles.center_x(i);
            let open_y = candles.scale_y(candle.open);
            let close_y = candles.scale_y(candle.close);

            CandleBox {
                center_x,
                body_x: center_x - candles.body_width / 2.0,
                body_y: open_y.min(close_y),
                body_width: candles.body_width,
                body_height: (close_y - open_y).abs().max(1.0),
                wick_top: candles.scale_y(candle.high),
                wick_bottom: candles.scale_y(candle.low),
                rising: candle.is_rising(),
            }
        })
        .collect()
}

/// Y positions of the horizontal grid rules
pub fn grid_lines(geometry: &ChartGeometry) -> Vec<f64> {
    (0..GRID_LINES)
        .map(|tick| geometry.padding + (tick as f64 / (GRID_LINES - 1) as f64) * geometry.inner_h)
        .collect()
}

/// Place a tooltip box next to `anchor`
///
/// Right of the anchor unless that crosses the right padding, then left of it. Above the
/// anchor, never above the top padding. When the frame is narrower than the box plus both
/// paddings, the box starts at the left padding and overhangs the right one.
pub fn tooltip_position(anchor: ChartPoint, size: (f64, f64), geometry: &ChartGeometry) -> TooltipPosition {
    let (width, height) = size;
    let right_limit = geometry.width - geometry.padding;

    let x = if anchor.x + TOOLTIP_MARGIN + width > right_limit {
        anchor.x - TOOLTIP_MARGIN - width
    } else {
        anchor.x + TOOLTIP_MARGIN
    };
    let x = x.min(right_limit - width).max(geometry.padding);
    let y = (anchor.y - height - TOOLTIP_LIFT).max(geometry.padding);

    TooltipPosition { x, y, width, height }
}

/// Index of the point horizontally closest to `x`; the first one wins a tie
pub fn nearest_point_index(points: &[ChartPoint], x: f64) -> Option<usize> {
    let mut closest = None;
    let mut closest_dist = f64::INFINITY;

    for (i, point) in points.iter().enumerate() {
        let dist = (point.x - x).abs();
        if dist < closest_dist || closest.is_none() {
            closest_dist = dist;
            closest = Some(i);
        }
    }

    closest
}

/// Candle bucket under `x`, clamped into `[0, count - 1]`
pub fn candle_index_at(x: f64, padding: f64, step: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    // NaN casts to 0 and infinities saturate, so the clamp below always lands in range
    let raw = ((x - padding) / step).floor() as i64;
    Some(raw.clamp(0, count as i64 - 1) as usize)
}

/// Scale a client coordinate on a rendered element back into frame units
pub fn client_to_frame_x(client_x: f64, rect_left: f64, rect_width: f64, frame_width: f64) -> f64 {
    if rect_width <= 0.0 {
        return 0.0;
    }
    ((client_x - rect_left) / rect_width) * frame_width
}

/// `$1,234.56` at or above one dollar, up to six decimals below it
pub fn format_price(price: f64) -> String {
    let sign = if price < 0.0 { "-" } else { "" };
    let price = price.abs();

    if price >= 1.0 {
        let fixed = format!("{:.2}", price);
        let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));
        return format!("{}${}.{}", sign, group_thousands(whole), cents);
    }

    let fixed = format!("{:.6}", price);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < 2 {
        fraction.push('0');
    }
    format!("{}${}.{}", sign, whole, fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Everything a surface needs to draw one series in one mode
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// Effective mode; candle requests without candle data fall back to line
    pub mode: ChartMode,
    pub geometry: ChartGeometry,
    pub bounds: PriceBounds,
    pub line: LineGeometry,
    pub candles: CandleGeometry,
    pub boxes: Vec<CandleBox>,
    pub grid: Vec<f64>,
}

impl ChartLayout {
    pub fn compute(series: &GeneratedSeries, mode: ChartMode, frame: &ChartFrame) -> Self {
        let geometry = chart_geometry(frame);
        let candle_mode = is_candle_mode(mode, &series.ohlc);
        let bounds = high_low(mode, &series.values, &series.ohlc);
        let line = line_geometry(&series.values, &geometry, candle_mode, None);
        let candles = candle_geometry(&series.ohlc, &geometry, &bounds, candle_mode);
        let boxes = candle_boxes(&series.ohlc, &candles);

        debug!(
            "Computed {} layout: {} points, {} candles, low {} high {}",
            mode,
            line.points.len(),
            boxes.len(),
            bounds.low,
            bounds.high
        );

        Self {
            mode: if candle_mode { ChartMode::Candle } else { ChartMode::Line },
            geometry,
            bounds,
            line,
            candles,
            boxes,
            grid: grid_lines(&geometry),
        }
    }

    /// Point the tooltip hangs off for `active`
    pub fn anchor(&self, active: usize) -> Option<ChartPoint> {
        match self.mode {
            ChartMode::Candle => self.boxes.get(active).map(|b| ChartPoint {
                x: b.center_x,
                y: b.wick_top,
            }),
            ChartMode::Line => self.line.points.get(active).copied(),
        }
    }

    pub fn tooltip(&self, active: usize) -> Option<TooltipPosition> {
        let size = match self.mode {
            ChartMode::Candle => CANDLE_TOOLTIP,
            ChartMode::Line => LINE_TOOLTIP,
        };
        self.anchor(active)
            .map(|anchor| tooltip_position(anchor, size, &self.geometry))
    }

    /// Resolve a frame X coordinate to a series index
    pub fn resolve_pointer(&self, x: f64) -> Option<usize> {
        match self.mode {
            ChartMode::Candle => candle_index_at(x, self.geometry.padding, self.candles.step, self.candles.count),
            ChartMode::Line => nearest_point_index(&self.line.points, x),
        }
    }
}
