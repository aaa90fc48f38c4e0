//! Marketplace seller API clients.
//!
//! Both marketplaces expose the same three capabilities (list offer ids,
//! push stock, push prices) behind different request shapes, batch limits
//! and pagination schemes. [`MarketplaceClient`] is the shared contract the
//! sync orchestrator drives.

mod ozon;
mod yandex;

use std::fmt;
use std::num::NonZeroUsize;

use async_trait::async_trait;

use crate::error::Result;
use crate::reconcile::{OfferIds, PriceUpdate, StockUpdate};

pub use ozon::OzonClient;
pub use yandex::YandexMarketClient;

/// Which marketplace a campaign lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MarketplaceKind {
    Ozon,
    #[value(name = "yandex")]
    YandexMarket,
}

impl fmt::Display for MarketplaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketplaceKind::Ozon => write!(f, "Ozon"),
            MarketplaceKind::YandexMarket => write!(f, "Yandex Market"),
        }
    }
}

/// A seller storefront on one marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    /// Label used in logs and reports, e.g. `yandex-fbs`
    pub name: String,
    pub kind: MarketplaceKind,
    /// Marketplace campaign id; Ozon scopes by credentials and ignores it
    pub id: String,
    /// Warehouse the stock is reported for, where the marketplace wants one
    pub warehouse_id: Option<String>,
}

/// Listing and update capabilities of one marketplace API.
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    fn kind(&self) -> MarketplaceKind;

    /// Currency code the price endpoint expects
    fn currency(&self) -> &str;

    /// Maximum stock records per request
    fn stock_batch_size(&self) -> NonZeroUsize;

    /// Maximum price records per request
    fn price_batch_size(&self) -> NonZeroUsize;

    /// Fetches every offer id listed on the campaign, following pagination
    /// to the end.
    async fn list_offer_ids(&self, campaign: &Campaign) -> Result<OfferIds>;

    /// Sends one batch of stock updates in a single request.
    async fn submit_stock_updates(&self, batch: &[StockUpdate], campaign: &Campaign)
        -> Result<()>;

    /// Sends one batch of price updates in a single request.
    async fn submit_price_updates(&self, batch: &[PriceUpdate], campaign: &Campaign)
        -> Result<()>;
}
