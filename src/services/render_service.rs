use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info};

use crate::models::{ChartMode, GeneratedSeries};
use crate::services::chart_service::{format_price, ChartLayout};
use crate::utils::errors::ChartError;

/// Colors used when drawing a chart
#[derive(Debug, Clone, Copy)]
pub struct ChartTheme {
    pub background: RGBColor,
    pub grid: RGBColor,
    pub accent: RGBColor,
    pub candle_up: RGBColor,
    pub candle_down: RGBColor,
    pub crosshair: RGBColor,
    pub tooltip_bg: RGBColor,
    pub tooltip_border: RGBColor,
    pub text: RGBColor,
    pub text_muted: RGBColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background: RGBColor(15, 23, 42),
            grid: RGBColor(30, 41, 59),
            accent: RGBColor(56, 189, 248),
            candle_up: RGBColor(34, 197, 94),
            candle_down: RGBColor(239, 68, 68),
            crosshair: RGBColor(148, 163, 184),
            tooltip_bg: RGBColor(2, 6, 23),
            tooltip_border: RGBColor(51, 65, 85),
            text: RGBColor(241, 245, 249),
            text_muted: RGBColor(148, 163, 184),
        }
    }
}

fn render_err<E: std::fmt::Display>(context: &str, e: E) -> ChartError {
    ChartError::Render(format!("{}: {}", context, e))
}

fn px(v: f64) -> i32 {
    v.round() as i32
}

fn surface_size(layout: &ChartLayout) -> (u32, u32) {
    (
        layout.geometry.width.max(1.0).round() as u32,
        layout.geometry.height.max(1.0).round() as u32,
    )
}

/// Render a chart to a PNG file
pub fn render_png(
    layout: &ChartLayout,
    series: &GeneratedSeries,
    active: Option<usize>,
    path: &Path,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, surface_size(layout)).into_drawing_area();
    draw_chart(&root, layout, series, active, &ChartTheme::default())?;
    root.present()
        .map_err(|e| render_err("Failed to write PNG", e))?;

    info!("Rendered {} chart to {}", layout.mode, path.display());
    Ok(())
}

/// Render a chart to an SVG document
pub fn render_svg(
    layout: &ChartLayout,
    series: &GeneratedSeries,
    active: Option<usize>,
) -> Result<String, ChartError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, surface_size(layout)).into_drawing_area();
        draw_chart(&root, layout, series, active, &ChartTheme::default())?;
        root.present()
            .map_err(|e| render_err("Failed to finish SVG", e))?;
    }

    debug!("Rendered {} chart as SVG ({} bytes)", layout.mode, svg.len());
    Ok(svg)
}

/// Draw grid, series and optional hover readout onto any plotters surface
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &ChartLayout,
    series: &GeneratedSeries,
    active: Option<usize>,
    theme: &ChartTheme,
) -> Result<(), ChartError> {
    let geo = &layout.geometry;

    root.fill(&theme.background)
        .map_err(|e| render_err("Failed to fill canvas", e))?;

    for &y in &layout.grid {
        root.draw(&PathElement::new(
            vec![(px(geo.padding), px(y)), (px(geo.width - geo.padding), px(y))],
            theme.grid.stroke_width(1),
        ))
        .map_err(|e| render_err("Failed to draw grid", e))?;
    }

    match layout.mode {
        ChartMode::Line => draw_line(root, layout, theme)?,
        ChartMode::Candle => draw_candles(root, layout, theme)?,
    }

    if let Some(index) = active {
        draw_readout(root, layout, series, index, theme)?;
    }

    Ok(())
}

fn draw_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &ChartLayout,
    theme: &ChartTheme,
) -> Result<(), ChartError> {
    let points: Vec<(i32, i32)> = layout.line.points.iter().map(|p| (px(p.x), px(p.y))).collect();
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(()),
    };
    let baseline = px(layout.geometry.baseline());

    let mut area = Vec::with_capacity(points.len() + 2);
    area.push((first.0, baseline));
    area.extend(points.iter().copied());
    area.push((last.0, baseline));
    root.draw(&Polygon::new(area, theme.accent.mix(0.2).filled()))
        .map_err(|e| render_err("Failed to draw area", e))?;

    root.draw(&PathElement::new(points, theme.accent.stroke_width(3)))
        .map_err(|e| render_err("Failed to draw line", e))?;
    root.draw(&Circle::new(last, 5, theme.accent.filled()))
        .map_err(|e| render_err("Failed to draw point", e))?;

    Ok(())
}

fn draw_candles<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &ChartLayout,
    theme: &ChartTheme,
) -> Result<(), ChartError> {
    for candle in &layout.boxes {
        let color = if candle.rising { theme.candle_up } else { theme.candle_down };
        let x = px(candle.center_x);

        root.draw(&PathElement::new(
            vec![(x, px(candle.wick_top)), (x, px(candle.wick_bottom))],
            color.stroke_width(2),
        ))
        .map_err(|e| render_err("Failed to draw wick", e))?;

        root.draw(&Rectangle::new(
            [
                (px(candle.body_x), px(candle.body_y)),
                (px(candle.body_x + candle.body_width), px(candle.body_y + candle.body_height)),
            ],
            color.filled(),
        ))
        .map_err(|e| render_err("Failed to draw body", e))?;
    }

    Ok(())
}

/// Dashed vertical rule, 4px on and 3px off
fn draw_crosshair<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    x: f64,
    top: f64,
    bottom: f64,
    color: &RGBColor,
) -> Result<(), ChartError> {
    let x = px(x);
    let mut y = top;
    while y < bottom {
        let end = (y + 4.0).min(bottom);
        root.draw(&PathElement::new(vec![(x, px(y)), (x, px(end))], color.stroke_width(1)))
            .map_err(|e| render_err("Failed to draw crosshair", e))?;
        y += 7.0;
    }
    Ok(())
}

fn draw_readout<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &ChartLayout,
    series: &GeneratedSeries,
    index: usize,
    theme: &ChartTheme,
) -> Result<(), ChartError> {
    let (anchor, tip) = match (layout.anchor(index), layout.tooltip(index)) {
        (Some(anchor), Some(tip)) => (anchor, tip),
        _ => return Ok(()),
    };
    let geo = &layout.geometry;
    let label = series.labels.get(index).cloned().unwrap_or_default();

    draw_crosshair(root, anchor.x, geo.padding, geo.baseline(), &theme.crosshair)?;

    let readout: Vec<(String, RGBColor, u32)> = match layout.mode {
        ChartMode::Line => {
            root.draw(&Circle::new((px(anchor.x), px(anchor.y)), 6, theme.accent.filled()))
                .map_err(|e| render_err("Failed to draw marker", e))?;
            let value = series.values.get(index).copied().unwrap_or_default();
            vec![
                (format_price(value), theme.text, 14),
                (label, theme.text_muted, 11),
            ]
        }
        ChartMode::Candle => {
            let band_x = geo.padding + index as f64 * layout.candles.step;
            root.draw(&Rectangle::new(
                [
                    (px(band_x), px(geo.padding)),
                    (px(band_x + layout.candles.step), px(geo.baseline())),
                ],
                theme.crosshair.mix(0.12).filled(),
            ))
            .map_err(|e| render_err("Failed to draw highlight", e))?;

            match series.ohlc.get(index) {
                Some(c) => vec![
                    (format!("O {}", format_price(c.open)), theme.candle_up, 11),
                    (format!("H {}", format_price(c.high)), theme.text, 11),
                    (format!("L {}", format_price(c.low)), theme.text, 11),
                    (format!("C {}", format_price(c.close)), theme.candle_down, 11),
                    (label, theme.text_muted, 10),
                ],
                None => vec![(label, theme.text_muted, 10)],
            }
        }
    };

    let corners = [(px(tip.x), px(tip.y)), (px(tip.right()), px(tip.y + tip.height))];
    root.draw(&Rectangle::new(corners, theme.tooltip_bg.filled()))
        .map_err(|e| render_err("Failed to draw tooltip", e))?;
    root.draw(&Rectangle::new(corners, theme.tooltip_border.stroke_width(1)))
        .map_err(|e| render_err("Failed to draw tooltip border", e))?;

    let line_height = tip.height / (readout.len() as f64 + 1.0);
    for (row, (text, color, size)) in readout.into_iter().enumerate() {
        let style = ("sans-serif", size)
            .into_font()
            .color(&color)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let y = tip.y + line_height * (row as f64 + 1.0);
        root.draw(&Text::new(text, (px(tip.x + tip.width / 2.0), px(y)), style))
            .map_err(|e| render_err("Failed to draw text", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartFrame, RangeCatalog, TimeRange};
    use crate::services::series_service::generate_range_series;
    use chrono::{TimeZone, Utc};

    fn sample() -> GeneratedSeries {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap();
        generate_range_series(&RangeCatalog::standard(), "solana", 161.43, 4.62, TimeRange::ThirtyDays, now).unwrap()
    }

    #[test]
    fn test_render_svg_line() {
        let series = sample();
        let layout = ChartLayout::compute(&series, ChartMode::Line, &ChartFrame::default());
        let svg = render_svg(&layout, &series, None).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_render_svg_candles() {
        let series = sample();
        let layout = ChartLayout::compute(&series, ChartMode::Candle, &ChartFrame::default());
        let svg = render_svg(&layout, &series, None).unwrap();
        // Background plus one body per candle
        assert!(svg.matches("<rect").count() >= series.ohlc.len());
    }

    #[test]
    fn test_render_svg_hover_readout() {
        let series = sample();
        for mode in [ChartMode::Line, ChartMode::Candle] {
            let layout = ChartLayout::compute(&series, mode, &ChartFrame::default());
            let plain = render_svg(&layout, &series, None).unwrap();
            let hovered = render_svg(&layout, &series, Some(29)).unwrap();

            assert!(!plain.contains("<text"), "{}", mode);
            assert!(hovered.contains("<text"), "{}", mode);
            assert!(hovered.contains(&series.labels[29]), "{}", mode);
            assert!(hovered.len() > plain.len());
        }
    }

    #[test]
    fn test_render_ignores_out_of_range_hover() {
        let series = sample();
        let layout = ChartLayout::compute(&series, ChartMode::Line, &ChartFrame::default());
        let plain = render_svg(&layout, &series, None).unwrap();
        let hovered = render_svg(&layout, &series, Some(series.len())).unwrap();
        assert_eq!(plain, hovered);
    }

    #[test]
    fn test_render_png_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let series = sample();
        let layout = ChartLayout::compute(&series, ChartMode::Candle, &ChartFrame::default());

        render_png(&layout, &series, None, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
