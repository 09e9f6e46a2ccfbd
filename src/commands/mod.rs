pub mod chart;
pub mod coins;
pub mod help;
pub mod series;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::models::{RangeCatalog, TimeRange};
use crate::services::catalog_service::CoinCatalog;
use crate::utils::errors::extract_clean_error;

/// Everything a command needs; built once at startup and shared between lines
pub struct ShellContext {
    pub config: AppConfig,
    pub catalog: CoinCatalog,
    pub ranges: RangeCatalog,
    /// Fixed clock for reproducible output, `None` means wall time
    pub clock: Option<DateTime<Utc>>,
}

impl ShellContext {
    pub fn new(config: AppConfig, catalog: CoinCatalog) -> Self {
        Self {
            config,
            catalog,
            ranges: RangeCatalog::standard(),
            clock: None,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }
}

/// Parse an optional range argument, falling back to `default`
pub(crate) fn parse_range(arg: Option<&str>, default: TimeRange) -> Result<TimeRange, String> {
    match arg {
        Some(raw) => raw.parse::<TimeRange>().map_err(|e| e.to_string()),
        None => Ok(default),
    }
}

/// Run one shell line. Returns `None` for blank lines and anything that is not a command.
pub async fn handle_line(ctx: &Arc<ShellContext>, line: &str) -> Option<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (&command, args) = parts.split_first()?;

    let result = match command.to_lowercase().as_str() {
        "$help" | "$h" => help::execute(),
        "$coins" | "$list" => coins::execute(ctx),
        "$ranges" => coins::execute_ranges(ctx),
        "$series" => series::execute(ctx, args),
        "$chart" | "$plot" => chart::execute(Arc::clone(ctx), args).await,
        _ => return None,
    };

    info!("Command {} finished (ok: {})", command, result.is_ok());

    Some(match result {
        Ok(output) => output,
        Err(e) => {
            error!("❌ Error executing command {}: {}", command, e);
            let clean_error = extract_clean_error(&e);
            if clean_error.is_empty() {
                "❌ An error occurred while executing the command.".to_string()
            } else {
                format!("❌ {}", clean_error)
            }
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn test_context(config: AppConfig) -> Arc<ShellContext> {
        let mut ctx = ShellContext::new(config, CoinCatalog::builtin().unwrap());
        ctx.clock = Some(Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap());
        Arc::new(ctx)
    }

    #[tokio::test]
    async fn test_ignores_non_commands() {
        let ctx = test_context(AppConfig::default());
        assert_eq!(handle_line(&ctx, "").await, None);
        assert_eq!(handle_line(&ctx, "   ").await, None);
        assert_eq!(handle_line(&ctx, "hello there").await, None);
        assert_eq!(handle_line(&ctx, "$unknown btc").await, None);
    }

    #[tokio::test]
    async fn test_errors_are_prefixed() {
        let ctx = test_context(AppConfig::default());
        let output = handle_line(&ctx, "$series nothing").await.unwrap();
        assert_eq!(output, "❌ Coin 'nothing' not found");

        let output = handle_line(&ctx, "$series btc 2W").await.unwrap();
        assert!(output.starts_with("❌ Unknown time range: '2W'"));
    }

    #[tokio::test]
    async fn test_help_dispatch() {
        let ctx = test_context(AppConfig::default());
        let output = handle_line(&ctx, "$HELP").await.unwrap();
        assert!(output.contains("$chart"));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range(None, TimeRange::SevenDays), Ok(TimeRange::SevenDays));
        assert_eq!(parse_range(Some("1y"), TimeRange::SevenDays), Ok(TimeRange::OneYear));
        assert!(parse_range(Some("5m"), TimeRange::SevenDays).is_err());
    }
}
