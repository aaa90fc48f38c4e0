//! Watch Stock Sync
//!
//! Pushes the supplier's current stock and prices to every configured
//! marketplace campaign, then exits. Exit status is non-zero if anything
//! failed.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use watch_stock_sync::http::build_client;
use watch_stock_sync::{
    Config, LocalFeed, MarketplaceKind, OzonClient, RemoteFeed, SupplierFeed, SyncOptions,
    SyncOrchestrator, YandexMarketClient,
};

/// Sync supplier watch stock and prices to Ozon and Yandex Market
#[derive(Parser, Debug)]
#[command(name = "watch_stock_sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Read the stock sheet (.zip or .xls) from disk instead of downloading it
    #[arg(long)]
    feed_file: Option<PathBuf>,

    /// Reconcile and report without pushing updates
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Only sync campaigns on this marketplace
    #[arg(long, value_enum)]
    only: Option<MarketplaceKind>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    log::info!("Starting watch_stock_sync...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let http = match build_client(config.http_timeout) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let mut orchestrator = SyncOrchestrator::new(SyncOptions {
        dry_run: args.dry_run,
    });
    let wanted = |kind: MarketplaceKind| args.only.map_or(true, |only| only == kind);

    if let Some(ozon) = config.ozon.as_ref().filter(|_| wanted(MarketplaceKind::Ozon)) {
        let client = Arc::new(OzonClient::new(
            http.clone(),
            ozon.client_id.clone(),
            ozon.api_key.clone(),
        ));
        if let Some(campaign) = config.ozon_campaign() {
            orchestrator.add_campaign(campaign, client);
        }
    }

    if let Some(yandex) = config
        .yandex
        .as_ref()
        .filter(|_| wanted(MarketplaceKind::YandexMarket))
    {
        let client = Arc::new(YandexMarketClient::new(http.clone(), yandex.token.clone()));
        for campaign in &yandex.campaigns {
            orchestrator.add_campaign(campaign.clone(), client.clone());
        }
    }

    if orchestrator.campaigns().next().is_none() {
        log::error!("No campaigns left to sync after applying --only");
        std::process::exit(1);
    }

    // Fetch supplier stock once for all campaigns
    let feed: Box<dyn SupplierFeed> = match args.feed_file {
        Some(path) => Box::new(LocalFeed::new(path)),
        None => Box::new(RemoteFeed::new(http.clone(), config.supplier_url.clone())),
    };
    let records = match feed.fetch_records().await {
        Ok(records) => records,
        Err(e) => {
            log::error!("Failed to load supplier stock: {}", e);
            std::process::exit(1);
        }
    };

    let report = orchestrator.run(&records).await;
    report.log();

    if report.is_success() {
        log::info!("Sync completed successfully.");
    } else {
        let failed = report.failures().count();
        log::error!(
            "Sync finished with {} of {} campaigns failed",
            failed,
            report.outcomes.len()
        );
        std::process::exit(1);
    }
}
