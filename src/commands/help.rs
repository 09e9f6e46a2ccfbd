pub fn execute() -> Result<String, String> {
    let lines = [
        "📖 CoinSight Commands",
        "",
        "📋 Catalogue",
        "  $coins                                    - List catalogue coins",
        "  $ranges                                   - List time ranges",
        "",
        "📈 Series & Charts",
        "  $series <coin> [range]                    - Print the generated series as JSON (default 7D)",
        "  $chart <coin> [range] [line|candle] [x]   - Render a chart, with a tooltip at frame x",
        "",
        "Coins match by id or symbol (bitcoin, BTC). Ranges: 1D, 7D, 30D, 90D, 1Y, ALL",
        "  $help                                     - Show this help message",
    ];
    Ok(lines.join("\n"))
}
