//! Stock reconciliation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::debug;

use super::normalize::normalize_quantity;
use super::{OfferIds, StockUpdate};
use crate::supplier::SupplierRecord;

/// Builds one stock update for every listed offer identifier.
///
/// Offers the supplier carries come first, in supplier order, with their
/// normalized quantity. Listed offers missing from the feed follow in
/// listing order with a quantity of 0. Supplier codes that are not listed
/// are dropped, and a code repeated in the feed only counts once.
///
/// `offer_ids` is left untouched.
pub fn reconcile_stocks(
    records: &[SupplierRecord],
    offer_ids: &OfferIds,
    warehouse_id: Option<&str>,
    updated_at: Option<DateTime<Utc>>,
) -> Vec<StockUpdate> {
    let update = |offer_id: &str, quantity: u64| StockUpdate {
        offer_id: offer_id.to_string(),
        quantity,
        warehouse_id: warehouse_id.map(str::to_string),
        updated_at,
    };

    let mut matched: HashSet<&str> = HashSet::with_capacity(offer_ids.len());
    let mut stocks = Vec::with_capacity(offer_ids.len());

    for record in records {
        let code = record.code.as_str();
        if offer_ids.contains(code) && matched.insert(code) {
            stocks.push(update(code, normalize_quantity(&record.quantity)));
        }
    }

    let missing = offer_ids
        .iter()
        .filter(|offer_id| !matched.contains(offer_id.as_str()));
    for offer_id in missing {
        stocks.push(update(offer_id, 0));
    }

    debug!(
        "Reconciled {} stock updates ({} from supplier, {} zeroed)",
        stocks.len(),
        matched.len(),
        stocks.len() - matched.len()
    );
    stocks
}
