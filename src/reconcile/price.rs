//! Price reconciliation.

use std::collections::HashSet;

use super::normalize::price_value;
use super::{OfferIds, PriceUpdate};
use crate::supplier::SupplierRecord;

/// Builds a price update for every supplier record that is listed.
///
/// Unlike stock, listed offers missing from the feed get no update.
/// A code repeated in the feed only counts once.
pub fn reconcile_prices(
    records: &[SupplierRecord],
    offer_ids: &OfferIds,
    currency: &str,
) -> Vec<PriceUpdate> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut prices = Vec::new();
    for record in records {
        let code = record.code.as_str();
        if offer_ids.contains(code) && seen.insert(code) {
            prices.push(PriceUpdate {
                offer_id: record.code.clone(),
                price: price_value(&record.price),
                currency: currency.to_string(),
            });
        }
    }
    prices
}
