use std::sync::Arc;

use tracing::info;

use crate::commands::{parse_range, ShellContext};
use crate::models::TimeRange;
use crate::services::series_service;

/// `$series <coin> [range]` - the generated series as pretty JSON
pub fn execute(ctx: &Arc<ShellContext>, args: &[&str]) -> Result<String, String> {
    let coin_arg = args
        .first()
        .ok_or_else(|| "Usage: `$series <coin> [range]`".to_string())?;
    let range = parse_range(args.get(1).copied(), TimeRange::SevenDays)?;
    let coin = ctx.catalog.find(coin_arg).map_err(|e| e.to_string())?;

    info!("📈 Generating {} series for {}", range, coin.id);
    let series = series_service::series_for_coin(coin, range, &ctx.ranges, ctx.now())
        .map_err(|e| e.to_string())?;

    serde_json::to_string_pretty(&series).map_err(|e| e.to_string())
}
