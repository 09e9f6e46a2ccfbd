use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::commands::{parse_range, ShellContext};
use crate::config::OutputFormat;
use crate::models::{ChartMode, TimeRange};
use crate::services::chart_service::{format_price, ChartLayout};
use crate::services::{render_service, series_service};
use crate::utils::errors::ChartError;

const USAGE: &str = "Usage: `$chart <coin> [range] [line|candle] [hover_x]`";

/// Parsed `$chart` arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub coin: String,
    pub range: TimeRange,
    pub mode: ChartMode,
    pub hover_x: Option<f64>,
}

impl ChartRequest {
    pub fn parse(args: &[&str]) -> Result<Self, String> {
        let coin = args.first().ok_or_else(|| USAGE.to_string())?;
        let range = parse_range(args.get(1).copied(), TimeRange::SevenDays)?;
        let mode = match args.get(2) {
            Some(raw) => raw.parse::<ChartMode>()?,
            None => ChartMode::Line,
        };
        let hover_x = match args.get(3) {
            Some(raw) => match raw.parse::<f64>() {
                Ok(x) if x.is_finite() => Some(x),
                _ => return Err(format!("Invalid hover position '{}'. {}", raw, USAGE)),
            },
            None => None,
        };

        Ok(Self {
            coin: coin.to_string(),
            range,
            mode,
            hover_x,
        })
    }
}

/// Output file for one chart, e.g. `charts/chart_bitcoin_7D_candle.png`
pub fn chart_path(dir: &std::path::Path, coin_id: &str, range: TimeRange, mode: ChartMode, format: OutputFormat) -> PathBuf {
    dir.join(format!("chart_{}_{}_{}.{}", coin_id, range, mode, format.extension()))
}

/// `$chart` - render a chart image and report where it went
pub async fn execute(ctx: Arc<ShellContext>, args: &[&str]) -> Result<String, String> {
    info!("🎨 Chart command received with args: {:?}", args);
    let request = ChartRequest::parse(args)?;

    let coin = ctx.catalog.find(&request.coin).map_err(|e| e.to_string())?.clone();
    let now = ctx.now();

    // plotters rasterises on the calling thread
    let summary = tokio::task::spawn_blocking(move || -> Result<String, ChartError> {
        let series = series_service::series_for_coin(&coin, request.range, &ctx.ranges, now)?;
        let layout = ChartLayout::compute(&series, request.mode, &ctx.config.frame);
        if layout.mode != request.mode {
            warn!("No candle data for {} {}, drawing a line chart", coin.id, request.range);
        }

        let active = request.hover_x.and_then(|x| layout.resolve_pointer(x));
        debug!("Hover {:?} resolved to index {:?}", request.hover_x, active);

        fs::create_dir_all(&ctx.config.output_dir)?;
        let path = chart_path(&ctx.config.output_dir, &coin.id, request.range, layout.mode, ctx.config.format);
        match ctx.config.format {
            OutputFormat::Png => render_service::render_png(&layout, &series, active, &path)?,
            OutputFormat::Svg => fs::write(&path, render_service::render_svg(&layout, &series, active)?)?,
        }

        let mut summary = format!(
            "✅ {} ({}) {} {} chart saved to {}",
            coin.name,
            coin.symbol,
            request.range.label(),
            layout.mode,
            path.display()
        );
        if let Some(index) = active {
            let label = series.labels.get(index).cloned().unwrap_or_default();
            let close = series.values.get(index).copied().unwrap_or_default();
            summary.push_str(&format!("\n   Point {}: {} at {}", index, format_price(close), label));
        }
        Ok(summary)
    })
    .await
    .map_err(|e| format!("Chart task failed: {}", e))?
    .map_err(|e| e.to_string())?;

    info!("✓ {}", summary);
    Ok(summary)
}
