use jobscout::driver::chromium::ChromiumLauncher;
use jobscout::{load_scout_config, strategy_by_name, CrawlSession};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = load_scout_config();
    let site = config.resolve_site();
    let strategy = strategy_by_name(&site)
        .ok_or_else(|| anyhow::anyhow!("unknown site '{}' (expected indeed or linkedin)", site))?;

    if config.searches.is_empty() {
        error!("no searches configured — add a \"searches\" list to jobscout.json");
        std::process::exit(2);
    }

    info!(
        "jobscout starting: site={} searches={} keywords={:?}",
        site,
        config.searches.len(),
        config.keywords,
    );

    let mut session = CrawlSession::new(strategy, Arc::new(ChromiumLauncher), &config);
    if let Err(e) = session.start().await {
        error!("crawl ended with error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
