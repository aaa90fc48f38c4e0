//! Tests for the sync orchestrator, driven by an in-memory marketplace.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{sync_campaign, Operation, SyncOptions, SyncOrchestrator};
use crate::error::{Result, SyncError};
use crate::marketplace::{Campaign, MarketplaceClient, MarketplaceKind};
use crate::reconcile::{batch_size, OfferIds, PriceUpdate, StockUpdate};
use crate::supplier::SupplierRecord;

/// Marketplace double that records every pushed batch.
struct FakeMarketplace {
    offer_ids: Vec<&'static str>,
    fail_listing: bool,
    /// Zero-based stock batch that answers with HTTP 500
    fail_stock_batch: Option<usize>,
    stock_size: NonZeroUsize,
    price_size: NonZeroUsize,
    stock_calls: Mutex<Vec<Vec<(String, u64)>>>,
    price_calls: Mutex<Vec<Vec<(String, u64)>>>,
}

impl FakeMarketplace {
    fn new(offer_ids: &[&'static str]) -> Self {
        Self {
            offer_ids: offer_ids.to_vec(),
            fail_listing: false,
            fail_stock_batch: None,
            stock_size: batch_size(2),
            price_size: batch_size(2),
            stock_calls: Mutex::new(Vec::new()),
            price_calls: Mutex::new(Vec::new()),
        }
    }

    fn stock_calls(&self) -> Vec<Vec<(String, u64)>> {
        self.stock_calls.lock().unwrap().clone()
    }

    fn price_calls(&self) -> Vec<Vec<(String, u64)>> {
        self.price_calls.lock().unwrap().clone()
    }
}

fn server_error() -> SyncError {
    SyncError::Remote {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".to_string(),
    }
}

#[async_trait]
impl MarketplaceClient for FakeMarketplace {
    fn kind(&self) -> MarketplaceKind {
        MarketplaceKind::Ozon
    }

    fn currency(&self) -> &str {
        "RUB"
    }

    fn stock_batch_size(&self) -> NonZeroUsize {
        self.stock_size
    }

    fn price_batch_size(&self) -> NonZeroUsize {
        self.price_size
    }

    async fn list_offer_ids(&self, _campaign: &Campaign) -> Result<OfferIds> {
        if self.fail_listing {
            return Err(server_error());
        }
        Ok(self.offer_ids.iter().map(|id| id.to_string()).collect())
    }

    async fn submit_stock_updates(&self, batch: &[StockUpdate], _campaign: &Campaign) -> Result<()> {
        let mut calls = self.stock_calls.lock().unwrap();
        if self.fail_stock_batch == Some(calls.len()) {
            return Err(server_error());
        }
        calls.push(
            batch
                .iter()
                .map(|s| (s.offer_id.clone(), s.quantity))
                .collect(),
        );
        Ok(())
    }

    async fn submit_price_updates(&self, batch: &[PriceUpdate], _campaign: &Campaign) -> Result<()> {
        self.price_calls.lock().unwrap().push(
            batch
                .iter()
                .map(|p| (p.offer_id.clone(), p.price))
                .collect(),
        );
        Ok(())
    }
}

fn record(code: &str, quantity: &str, price: &str) -> SupplierRecord {
    SupplierRecord {
        code: code.to_string(),
        quantity: quantity.to_string(),
        price: price.to_string(),
    }
}

fn supplier_feed() -> Vec<SupplierRecord> {
    vec![
        record("X", "5", "1'000.00"),
        record("Y", ">10", "2'500.50"),
        record("Z", "1", "300.00"),
    ]
}

fn campaign(name: &str) -> Campaign {
    Campaign {
        name: name.to_string(),
        kind: MarketplaceKind::Ozon,
        id: "1".to_string(),
        warehouse_id: Some("w1".to_string()),
    }
}

fn pairs(items: &[(&str, u64)]) -> Vec<(String, u64)> {
    items.iter().map(|(id, n)| (id.to_string(), *n)).collect()
}

#[tokio::test]
async fn pushes_stock_then_prices_in_batches() {
    let marketplace = FakeMarketplace::new(&["X", "Y", "W"]);

    let summary = sync_campaign(
        &marketplace,
        &campaign("ozon"),
        &supplier_feed(),
        SyncOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        marketplace.stock_calls(),
        vec![pairs(&[("X", 5), ("Y", 100)]), pairs(&[("W", 0)])]
    );
    assert_eq!(
        marketplace.price_calls(),
        vec![pairs(&[("X", 1000), ("Y", 2500)])]
    );
    assert_eq!(summary.listed, 3);
    assert_eq!(summary.stock_updates, 3);
    assert_eq!(summary.in_stock, 2);
    assert_eq!(summary.stock_batches, 2);
    assert_eq!(summary.price_updates, 2);
    assert_eq!(summary.price_batches, 1);
    assert!(!summary.dry_run);
}

#[tokio::test]
async fn listing_failure_pushes_nothing() {
    let mut marketplace = FakeMarketplace::new(&["X"]);
    marketplace.fail_listing = true;

    let failure = sync_campaign(
        &marketplace,
        &campaign("ozon"),
        &supplier_feed(),
        SyncOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(failure.operation, Operation::ListOffers);
    assert!(failure.batch.is_none());
    assert!(failure.source.is_remote());
    assert!(marketplace.stock_calls().is_empty());
    assert!(marketplace.price_calls().is_empty());
}

#[tokio::test]
async fn failed_stock_batch_aborts_the_campaign() {
    let mut marketplace = FakeMarketplace::new(&["X", "Y", "W", "V", "U"]);
    marketplace.fail_stock_batch = Some(1);

    let failure = sync_campaign(
        &marketplace,
        &campaign("ozon"),
        &supplier_feed(),
        SyncOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(failure.operation, Operation::SubmitStocks);
    let batch = failure.batch.unwrap();
    assert_eq!((batch.index, batch.total), (1, 3));
    assert_eq!(marketplace.stock_calls().len(), 1, "later batches must not be sent");
    assert!(marketplace.price_calls().is_empty());
    assert_eq!(
        failure.to_string(),
        "[ozon] Ozon submit stocks failed at batch 2/3: Remote error: HTTP 500 Internal Server Error: boom"
    );
}

#[tokio::test]
async fn dry_run_submits_nothing() {
    let marketplace = FakeMarketplace::new(&["X", "Y", "W"]);

    let summary = sync_campaign(
        &marketplace,
        &campaign("ozon"),
        &supplier_feed(),
        SyncOptions { dry_run: true },
    )
    .await
    .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.stock_batches, 2);
    assert!(marketplace.stock_calls().is_empty());
    assert!(marketplace.price_calls().is_empty());
}

#[tokio::test]
async fn campaigns_fail_independently() {
    let healthy = Arc::new(FakeMarketplace::new(&["X", "Y"]));
    let mut broken = FakeMarketplace::new(&["X"]);
    broken.fail_listing = true;
    let broken = Arc::new(broken);

    let mut orchestrator = SyncOrchestrator::new(SyncOptions::default());
    orchestrator.add_campaign(campaign("healthy"), healthy.clone());
    orchestrator.add_campaign(campaign("broken"), broken.clone());

    let names: Vec<&str> = orchestrator.campaigns().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["healthy", "broken"]);

    let report = orchestrator.run(&supplier_feed()).await;

    assert!(!report.is_success());
    let summaries: Vec<&str> = report.summaries().map(|s| s.campaign.as_str()).collect();
    let failures: Vec<&str> = report.failures().map(|f| f.campaign.as_str()).collect();
    assert_eq!(summaries, vec!["healthy"]);
    assert_eq!(failures, vec!["broken"]);
    assert_eq!(
        healthy.stock_calls(),
        vec![pairs(&[("X", 5), ("Y", 100)])]
    );
}

#[tokio::test]
async fn empty_run_is_successful() {
    let orchestrator = SyncOrchestrator::new(SyncOptions::default());
    let report = orchestrator.run(&supplier_feed()).await;
    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 0);
}
