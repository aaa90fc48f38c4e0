//! Reconciliation of supplier stock against marketplace listings.
//!
//! Pure functions only: the supplier records and the listed offer
//! identifiers go in, marketplace-agnostic update records come out.
//! Adapters translate those records into their own wire formats.

mod batch;
mod normalize;
mod price;
mod stock;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;

pub use batch::{batch_count, batch_size, batches};
pub use normalize::{normalize_price, normalize_quantity, price_value};
pub use price::reconcile_prices;
pub use stock::reconcile_stocks;

/// Offer identifiers listed on one campaign, in listing order.
pub type OfferIds = IndexSet<String>;

/// Stock level for one listed offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdate {
    pub offer_id: String,
    pub quantity: u64,
    pub warehouse_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Price for one listed offer that the supplier carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub offer_id: String,
    pub price: u64,
    pub currency: String,
}
