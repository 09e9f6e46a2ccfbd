use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use coinsight_charts::commands::{self, ShellContext};
use coinsight_charts::{AppConfig, CoinCatalog};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = match "coinsight_charts=debug".parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    info!("📈 Starting CoinSight chart shell v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return;
        }
    };

    let catalog = match &config.catalog_path {
        Some(path) => CoinCatalog::from_path(path),
        None => CoinCatalog::builtin(),
    };
    let catalog = match catalog {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load coin catalogue: {}", e);
            return;
        }
    };
    info!(
        "Loaded {} coins, frame {}x{}, writing {} charts to {}",
        catalog.len(),
        config.frame.width,
        config.frame.height,
        config.format,
        config.output_dir.display()
    );

    let ctx = Arc::new(ShellContext::new(config, catalog));

    // One-shot mode: `coinsight '$chart btc 30d candle'`
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if !argv.is_empty() {
        match commands::handle_line(&ctx, &argv.join(" ")).await {
            Some(output) => println!("{}", output),
            None => warn!("Not a command: {}", argv.join(" ")),
        }
        return;
    }

    info!("Type $help for commands, Ctrl-D to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if let Some(output) = commands::handle_line(&ctx, &line).await {
                    println!("{}", output);
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        }
    }

    info!("👋 Shell closed");
}
