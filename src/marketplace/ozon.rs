//! Ozon Seller API client.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Campaign, MarketplaceClient, MarketplaceKind};
use crate::error::Result;
use crate::http::ensure_success;
use crate::reconcile::{batch_size, OfferIds, PriceUpdate, StockUpdate};

const DEFAULT_BASE_URL: &str = "https://api-seller.ozon.ru";
const LIST_PAGE_LIMIT: u32 = 1000;
const CURRENCY: &str = "RUB";

/// Ozon accepts at most 100 stock records per request
pub const STOCK_BATCH_SIZE: NonZeroUsize = batch_size(100);
/// Ozon accepts at most 1000 price records per request
pub const PRICE_BATCH_SIZE: NonZeroUsize = batch_size(1000);

#[derive(Debug, Serialize)]
struct ProductListRequest<'a> {
    filter: ProductFilter,
    last_id: &'a str,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct ProductFilter {
    visibility: &'static str,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    result: ProductListPage,
}

#[derive(Debug, Deserialize)]
struct ProductListPage {
    #[serde(default)]
    items: Vec<ProductItem>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    last_id: String,
}

#[derive(Debug, Deserialize)]
struct ProductItem {
    offer_id: String,
}

#[derive(Debug, Serialize)]
struct StocksRequest<'a> {
    stocks: Vec<OzonStock<'a>>,
}

#[derive(Debug, Serialize)]
struct OzonStock<'a> {
    offer_id: &'a str,
    stock: u64,
}

#[derive(Debug, Serialize)]
struct PricesRequest<'a> {
    prices: Vec<OzonPrice<'a>>,
}

#[derive(Debug, Serialize)]
struct OzonPrice<'a> {
    auto_action_enabled: &'static str,
    currency_code: &'a str,
    offer_id: &'a str,
    old_price: &'static str,
    price: String,
}

/// Ozon Seller API client, scoped to one seller account by its
/// `Client-Id` / `Api-Key` pair.
pub struct OzonClient {
    pub(crate) client: Client,
    pub(crate) client_id: String,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) stock_batch_size: NonZeroUsize,
    pub(crate) price_batch_size: NonZeroUsize,
}

impl OzonClient {
    pub fn new(client: Client, client_id: String, api_key: String) -> Self {
        debug!("Creating Ozon client for client id {client_id}");
        Self {
            client,
            client_id,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            stock_batch_size: STOCK_BATCH_SIZE,
            price_batch_size: PRICE_BATCH_SIZE,
        }
    }

    /// Points the client at another API host (staging, mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the per-request record limits.
    pub fn with_batch_sizes(mut self, stock: NonZeroUsize, price: NonZeroUsize) -> Self {
        self.stock_batch_size = stock;
        self.price_batch_size = price;
        self
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;
        ensure_success(response).await
    }

    async fn fetch_product_page(&self, last_id: &str) -> Result<ProductListPage> {
        let request = ProductListRequest {
            filter: ProductFilter { visibility: "ALL" },
            last_id,
            limit: LIST_PAGE_LIMIT,
        };
        let response = self.post("/v2/product/list", &request).await?;
        let page: ProductListResponse = response.json().await?;
        Ok(page.result)
    }
}

#[async_trait]
impl MarketplaceClient for OzonClient {
    fn kind(&self) -> MarketplaceKind {
        MarketplaceKind::Ozon
    }

    fn currency(&self) -> &str {
        CURRENCY
    }

    fn stock_batch_size(&self) -> NonZeroUsize {
        self.stock_batch_size
    }

    fn price_batch_size(&self) -> NonZeroUsize {
        self.price_batch_size
    }

    async fn list_offer_ids(&self, campaign: &Campaign) -> Result<OfferIds> {
        let mut offer_ids = OfferIds::new();
        let mut fetched: u64 = 0;
        let mut last_id = String::new();

        loop {
            let page = self.fetch_product_page(&last_id).await?;
            let count = page.items.len() as u64;
            fetched += count;
            offer_ids.extend(page.items.into_iter().map(|item| item.offer_id));
            debug!(
                "[{}] fetched {} products ({}/{})",
                campaign.name, count, fetched, page.total
            );

            if fetched >= page.total {
                break;
            }
            if count == 0 {
                warn!(
                    "[{}] empty product page before reaching total {}, stopping at {}",
                    campaign.name, page.total, fetched
                );
                break;
            }
            last_id = page.last_id;
        }

        info!("[{}] {} offers listed on Ozon", campaign.name, offer_ids.len());
        Ok(offer_ids)
    }

    async fn submit_stock_updates(
        &self,
        batch: &[StockUpdate],
        campaign: &Campaign,
    ) -> Result<()> {
        let request = StocksRequest {
            stocks: batch
                .iter()
                .map(|s| OzonStock {
                    offer_id: &s.offer_id,
                    stock: s.quantity,
                })
                .collect(),
        };
        self.post("/v1/product/import/stocks", &request).await?;
        debug!("[{}] pushed {} stock records", campaign.name, batch.len());
        Ok(())
    }

    async fn submit_price_updates(
        &self,
        batch: &[PriceUpdate],
        campaign: &Campaign,
    ) -> Result<()> {
        let request = PricesRequest {
            prices: batch
                .iter()
                .map(|p| OzonPrice {
                    auto_action_enabled: "UNKNOWN",
                    currency_code: &p.currency,
                    offer_id: &p.offer_id,
                    old_price: "0",
                    price: p.price.to_string(),
                })
                .collect(),
        };
        self.post("/v1/product/import/prices", &request).await?;
        debug!("[{}] pushed {} price records", campaign.name, batch.len());
        Ok(())
    }
}

#[cfg(test)]
#[path = "ozon_tests.rs"]
mod tests;
