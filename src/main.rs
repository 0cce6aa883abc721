use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use oliveyoung_crawler::crawling::{CategoryNavigator, CrawlEngine, RecoveryCrawler};
use oliveyoung_crawler::domain::reconcile;
use oliveyoung_crawler::domain::taxonomy::CategoryTaxonomy;
use oliveyoung_crawler::infrastructure::config::{AppConfig, DEFAULT_CONFIG_FILE};
use oliveyoung_crawler::infrastructure::http_client::HttpClient;
use oliveyoung_crawler::infrastructure::{logging, storage};

#[derive(Parser)]
#[command(name = "oliveyoung-crawler", version, about = "Olive Young catalog crawler")]
struct Cli {
    /// Path to the configuration file. Created with defaults when absent.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover the category taxonomy and write it to the categories file.
    Categories,
    /// Crawl every category and write the product dataset.
    Crawl,
    /// Find t_number gaps in the crawled dataset and re-crawl for them.
    Recover,
    /// Merge the crawled and recovered datasets into the complete one.
    Merge,
    /// Categories, crawl, recover, and merge in one run.
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_init(&cli.config).await?;
    logging::init_logging(&config.logging)?;

    let fetcher = Arc::new(HttpClient::new(config.http.clone())?);

    match cli.command {
        Command::Categories => {
            discover_categories(fetcher, &config).await?;
        }
        Command::Crawl => {
            let taxonomy = load_or_discover_taxonomy(fetcher.clone(), &config).await?;
            crawl(fetcher, &config, &taxonomy).await?;
        }
        Command::Recover => {
            let taxonomy = load_or_discover_taxonomy(fetcher.clone(), &config).await?;
            recover(fetcher, &config, &taxonomy).await?;
        }
        Command::Merge => {
            merge(&config).await?;
        }
        Command::Run => {
            let taxonomy = discover_categories(fetcher.clone(), &config).await?;
            crawl(fetcher.clone(), &config, &taxonomy).await?;
            recover(fetcher, &config, &taxonomy).await?;
            merge(&config).await?;
        }
    }

    Ok(())
}

async fn discover_categories(
    fetcher: Arc<HttpClient>,
    config: &AppConfig,
) -> Result<CategoryTaxonomy> {
    let navigator = CategoryNavigator::new(fetcher);
    let taxonomy = navigator
        .discover_taxonomy(&config.crawling.seed_url)
        .await?;
    taxonomy.save(&config.crawling.categories_path).await?;
    info!(
        groups = taxonomy.len(),
        categories = taxonomy.category_count(),
        path = %config.crawling.categories_path,
        "taxonomy saved"
    );
    Ok(taxonomy)
}

/// Prefer a previously saved taxonomy; discover one only when the file is
/// absent, so `crawl` and `recover` runs stay repeatable.
async fn load_or_discover_taxonomy(
    fetcher: Arc<HttpClient>,
    config: &AppConfig,
) -> Result<CategoryTaxonomy> {
    match CategoryTaxonomy::load(&config.crawling.categories_path).await {
        Ok(taxonomy) => Ok(taxonomy),
        Err(_) => {
            info!("no saved taxonomy, discovering one");
            discover_categories(fetcher, config).await
        }
    }
}

async fn crawl(
    fetcher: Arc<HttpClient>,
    config: &AppConfig,
    taxonomy: &CategoryTaxonomy,
) -> Result<()> {
    let engine = CrawlEngine::new(fetcher, config.crawling.clone());
    let (products, report) = engine.crawl(taxonomy).await?;
    storage::save_products(&config.crawling.products_path, &products).await?;

    let report_json =
        serde_json::to_string(&report).context("Failed to serialize crawl report")?;
    info!(report = %report_json, "crawl report");
    Ok(())
}

async fn recover(
    fetcher: Arc<HttpClient>,
    config: &AppConfig,
    taxonomy: &CategoryTaxonomy,
) -> Result<()> {
    let products = storage::load_products(&config.crawling.products_path).await?;
    let missing = reconcile::find_missing(&products, config.crawling.expected_max_t_number);
    if missing.is_empty() {
        info!("no t_number gaps, skipping recovery");
        storage::save_products(&config.crawling.recovered_path, &[]).await?;
        return Ok(());
    }

    let crawler = RecoveryCrawler::new(fetcher, config.crawling.clone());
    let outcome = crawler.recover(taxonomy, missing).await?;
    storage::save_products(&config.crawling.recovered_path, &outcome.recovered).await?;
    info!(
        recovered = outcome.recovered.len(),
        still_missing = ?outcome.still_missing,
        still_failed = ?outcome.still_failed,
        "recovery finished"
    );
    Ok(())
}

async fn merge(config: &AppConfig) -> Result<()> {
    let original = storage::load_products(&config.crawling.products_path).await?;
    let recovered = storage::load_products_or_empty(&config.crawling.recovered_path).await?;

    let outcome = reconcile::merge(original, recovered);
    storage::save_products(&config.crawling.merged_path, &outcome.merged).await?;
    info!(
        merged = outcome.merged.len(),
        inserted = outcome.inserted,
        replaced = outcome.replaced,
        dropped_keyless = outcome.dropped_keyless,
        still_missing = outcome.still_missing.len(),
        "merge finished"
    );
    Ok(())
}
