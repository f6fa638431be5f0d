use anyhow::Result;
use gamma_feed::GammaClient;
use market_db::IngestStore;
use market_ingest_bot::logging::init_tracing;
use market_ingest_bot::{config_path_from_env, KeywordCategorizer, PipelineConfig, PipelineRunner};
use market_transformer::MarketTransformer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load config first (before logging is initialized)
    let config_path = config_path_from_env();
    let config = PipelineConfig::load(&config_path)?;

    init_tracing(&config.log_level);
    config.log();

    print_banner("Market Ingest Pipeline");

    let client = GammaClient::new(&config.gamma_api_url);
    let store = IngestStore::new(&config.database_path).await?;
    let transformer = MarketTransformer::with_patterns(config.pattern_set()?);
    let categorizer = Box::new(KeywordCategorizer::new());

    let runner = PipelineRunner::new(client, store, transformer, categorizer);

    let stats = runner.run_once().await?;

    info!(
        "Queued {} market(s) for approval ({} flagged for manual review)",
        stats.queued, stats.needs_manual
    );

    print_shutdown("Market Ingest Pipeline");
    Ok(())
}

fn print_banner(name: &str) {
    info!("");
    info!("========================================");
    info!("Starting {}", name);
    info!("========================================");
    info!("");
}

fn print_shutdown(name: &str) {
    info!("");
    info!("========================================");
    info!("{} finished", name);
    info!("========================================");
}
