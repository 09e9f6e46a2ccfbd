use std::sync::Arc;

use crate::commands::ShellContext;
use crate::services::chart_service::format_price;
use crate::utils::table::Table;

/// `$coins` - the catalogue as a table
pub fn execute(ctx: &Arc<ShellContext>) -> Result<String, String> {
    if ctx.catalog.is_empty() {
        return Err("The coin catalogue is empty".to_string());
    }

    let mut table = Table::new(vec!["ID", "Symbol", "Name", "Price", "24h"])
        .align_right(3)
        .align_right(4);

    for coin in ctx.catalog.coins() {
        table.add_row(vec![
            coin.id.clone(),
            coin.symbol.clone(),
            coin.name.clone(),
            format_price(coin.price),
            format!("{:+.2}%", coin.change24h),
        ]);
    }

    Ok(format!("🪙 {} coins\n{}", table.len(), table.render()))
}

/// `$ranges` - the range catalogue as a table
pub fn execute_ranges(ctx: &Arc<ShellContext>) -> Result<String, String> {
    let mut table = Table::new(vec!["Range", "Label", "Points", "Volatility", "Format"])
        .align_right(2)
        .align_right(3);

    for (range, config) in ctx.ranges.iter() {
        table.add_row(vec![
            range.as_str().to_string(),
            range.label().to_string(),
            config.points.to_string(),
            format!("{:.3}", config.volatility),
            config.label_format.pattern().to_string(),
        ]);
    }

    Ok(table.render())
}
