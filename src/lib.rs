//! Watch Stock Sync - supplier stock to marketplace listings
//!
//! Downloads the supplier's watch stock sheet and pushes stock levels and
//! prices to the seller's Ozon and Yandex Market storefronts.

pub mod config;
pub mod error;
pub mod http;
pub mod marketplace;
pub mod reconcile;
pub mod supplier;
pub mod sync;

pub use config::Config;
pub use error::{Result, SyncError};
pub use marketplace::{Campaign, MarketplaceClient, MarketplaceKind, OzonClient, YandexMarketClient};
pub use reconcile::{OfferIds, PriceUpdate, StockUpdate};
pub use supplier::{LocalFeed, RemoteFeed, SupplierFeed, SupplierRecord};
pub use sync::{SyncOptions, SyncOrchestrator, SyncReport};
