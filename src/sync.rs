//! Sync orchestration: list, reconcile and push, per campaign.
//!
//! Each campaign runs the same sequence:
//! 1. fetch the listed offer ids
//! 2. reconcile stock and push it batch by batch
//! 3. reconcile prices and push them batch by batch
//!
//! The first failing call aborts the rest of that campaign only. Campaigns
//! run concurrently and share nothing but the read-only supplier records.

use std::fmt;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use futures::future::join_all;
use log::{error, info};

use crate::error::SyncError;
use crate::marketplace::{Campaign, MarketplaceClient, MarketplaceKind};
use crate::reconcile::{batch_count, batches, reconcile_prices, reconcile_stocks};
use crate::supplier::SupplierRecord;

/// Step of a campaign sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListOffers,
    SubmitStocks,
    SubmitPrices,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ListOffers => write!(f, "list offers"),
            Operation::SubmitStocks => write!(f, "submit stocks"),
            Operation::SubmitPrices => write!(f, "submit prices"),
        }
    }
}

/// Position of a failed batch within its operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPosition {
    /// Zero-based batch index
    pub index: usize,
    pub total: usize,
}

/// Why a campaign sync stopped.
#[derive(Debug)]
pub struct CampaignFailure {
    pub campaign: String,
    pub marketplace: MarketplaceKind,
    pub operation: Operation,
    pub batch: Option<BatchPosition>,
    pub source: SyncError,
}

impl fmt::Display for CampaignFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} failed",
            self.campaign, self.marketplace, self.operation
        )?;
        if let Some(batch) = self.batch {
            write!(f, " at batch {}/{}", batch.index + 1, batch.total)?;
        }
        write!(f, ": {}", self.source)
    }
}

impl std::error::Error for CampaignFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// What a successful campaign sync pushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSummary {
    pub campaign: String,
    pub marketplace: MarketplaceKind,
    pub listed: usize,
    pub stock_updates: usize,
    /// Stock updates with a non-zero quantity
    pub in_stock: usize,
    pub stock_batches: usize,
    pub price_updates: usize,
    pub price_batches: usize,
    pub dry_run: bool,
}

pub type CampaignOutcome = std::result::Result<CampaignSummary, CampaignFailure>;

/// Outcome of every campaign in one run
#[derive(Debug)]
pub struct SyncReport {
    pub outcomes: Vec<CampaignOutcome>,
}

impl SyncReport {
    /// True iff no campaign failed
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    pub fn summaries(&self) -> impl Iterator<Item = &CampaignSummary> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CampaignFailure> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// Logs one line per campaign.
    pub fn log(&self) {
        for summary in self.summaries() {
            info!(
                "[{}] {}{}: {} listed, {} stock updates ({} in stock) in {} batches, {} price updates in {} batches",
                summary.campaign,
                summary.marketplace,
                if summary.dry_run { " (dry run)" } else { "" },
                summary.listed,
                summary.stock_updates,
                summary.in_stock,
                summary.stock_batches,
                summary.price_updates,
                summary.price_batches
            );
        }
        for failure in self.failures() {
            error!("{failure}");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Reconcile and count batches without pushing anything
    pub dry_run: bool,
}

struct CampaignTarget {
    campaign: Campaign,
    client: Arc<dyn MarketplaceClient>,
}

/// Drives the sync of every registered campaign.
#[derive(Default)]
pub struct SyncOrchestrator {
    targets: Vec<CampaignTarget>,
    options: SyncOptions,
}

impl SyncOrchestrator {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            targets: Vec::new(),
            options,
        }
    }

    /// Registers a campaign and the client that serves it. Several
    /// campaigns may share one client.
    pub fn add_campaign(&mut self, campaign: Campaign, client: Arc<dyn MarketplaceClient>) {
        info!("Registered campaign {} on {}", campaign.name, client.kind());
        self.targets.push(CampaignTarget { campaign, client });
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &Campaign> {
        self.targets.iter().map(|t| &t.campaign)
    }

    /// Syncs all campaigns concurrently against the same supplier records.
    pub async fn run(&self, records: &[SupplierRecord]) -> SyncReport {
        info!(
            "Syncing {} campaigns against {} supplier records",
            self.targets.len(),
            records.len()
        );
        let runs = self.targets.iter().map(|target| {
            sync_campaign(target.client.as_ref(), &target.campaign, records, self.options)
        });
        SyncReport {
            outcomes: join_all(runs).await,
        }
    }
}

/// Runs list → reconcile → push for one campaign.
pub async fn sync_campaign(
    client: &dyn MarketplaceClient,
    campaign: &Campaign,
    records: &[SupplierRecord],
    options: SyncOptions,
) -> CampaignOutcome {
    let fail = |operation: Operation, batch: Option<BatchPosition>| {
        move |source: SyncError| CampaignFailure {
            campaign: campaign.name.clone(),
            marketplace: client.kind(),
            operation,
            batch,
            source,
        }
    };

    info!("[{}] Fetching offers from {}", campaign.name, client.kind());
    let offer_ids = client
        .list_offer_ids(campaign)
        .await
        .map_err(fail(Operation::ListOffers, None))?;

    let updated_at = Utc::now().trunc_subsecs(0);
    let stocks = reconcile_stocks(
        records,
        &offer_ids,
        campaign.warehouse_id.as_deref(),
        Some(updated_at),
    );
    let in_stock = stocks.iter().filter(|s| s.quantity > 0).count();
    let stock_size = client.stock_batch_size();
    let stock_batches = batch_count(stocks.len(), stock_size);
    info!(
        "[{}] {} stock updates ({} in stock) in {} batches",
        campaign.name,
        stocks.len(),
        in_stock,
        stock_batches
    );

    if !options.dry_run {
        for (index, batch) in batches(&stocks, stock_size).enumerate() {
            let position = BatchPosition {
                index,
                total: stock_batches,
            };
            client
                .submit_stock_updates(batch, campaign)
                .await
                .map_err(fail(Operation::SubmitStocks, Some(position)))?;
        }
    }

    let prices = reconcile_prices(records, &offer_ids, client.currency());
    let price_size = client.price_batch_size();
    let price_batches = batch_count(prices.len(), price_size);
    info!(
        "[{}] {} price updates in {} batches",
        campaign.name,
        prices.len(),
        price_batches
    );

    if !options.dry_run {
        for (index, batch) in batches(&prices, price_size).enumerate() {
            let position = BatchPosition {
                index,
                total: price_batches,
            };
            client
                .submit_price_updates(batch, campaign)
                .await
                .map_err(fail(Operation::SubmitPrices, Some(position)))?;
        }
    }

    Ok(CampaignSummary {
        campaign: campaign.name.clone(),
        marketplace: client.kind(),
        listed: offer_ids.len(),
        stock_updates: stocks.len(),
        in_stock,
        stock_batches,
        price_updates: prices.len(),
        price_batches,
        dry_run: options.dry_run,
    })
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
