//! Yandex Market Partner API client.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Campaign, MarketplaceClient, MarketplaceKind};
use crate::error::Result;
use crate::http::ensure_success;
use crate::reconcile::{batch_size, OfferIds, PriceUpdate, StockUpdate};

const DEFAULT_BASE_URL: &str = "https://api.partner.market.yandex.ru";
const LIST_PAGE_LIMIT: u32 = 200;
const CURRENCY: &str = "RUR";
/// Stock type for goods available for sale
const STOCK_TYPE_FIT: &str = "FIT";

/// Yandex Market accepts at most 2000 stock records per request
pub const STOCK_BATCH_SIZE: NonZeroUsize = batch_size(2000);
/// Yandex Market accepts at most 500 price records per request
pub const PRICE_BATCH_SIZE: NonZeroUsize = batch_size(500);

#[derive(Debug, Deserialize)]
struct MappingEntriesResponse {
    result: MappingEntriesPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappingEntriesPage {
    #[serde(default)]
    offer_mapping_entries: Vec<MappingEntry>,
    #[serde(default)]
    paging: Paging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paging {
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MappingEntry {
    offer: MappedOffer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappedOffer {
    shop_sku: String,
}

#[derive(Debug, Serialize)]
struct StocksRequest<'a> {
    skus: Vec<SkuStock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkuStock<'a> {
    sku: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse_id: Option<&'a str>,
    items: [StockItem; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockItem {
    count: u64,
    #[serde(rename = "type")]
    kind: &'static str,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct PricesRequest<'a> {
    offers: Vec<OfferPrice<'a>>,
}

#[derive(Debug, Serialize)]
struct OfferPrice<'a> {
    id: &'a str,
    price: PriceValue<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceValue<'a> {
    value: u64,
    currency_id: &'a str,
}

/// Formats a stock timestamp the way the stocks endpoint expects it,
/// e.g. `2024-03-01T12:00:00Z`.
pub(crate) fn format_updated_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Yandex Market Partner API client. One OAuth token serves every campaign
/// of the seller; the campaign id goes into each request path.
pub struct YandexMarketClient {
    pub(crate) client: Client,
    pub(crate) token: String,
    pub(crate) base_url: String,
    pub(crate) stock_batch_size: NonZeroUsize,
    pub(crate) price_batch_size: NonZeroUsize,
}

impl YandexMarketClient {
    pub fn new(client: Client, token: String) -> Self {
        debug!("Creating Yandex Market client (token length {})", token.len());
        Self {
            client,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            stock_batch_size: STOCK_BATCH_SIZE,
            price_batch_size: PRICE_BATCH_SIZE,
        }
    }

    /// Points the client at another API host (sandbox, mock server).
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

    fn campaign_url(&self, campaign: &Campaign, endpoint: &str) -> String {
        format!("{}/campaigns/{}/{}", self.base_url, campaign.id, endpoint)
    }

    async fn fetch_mapping_page(
        &self,
        campaign: &Campaign,
        page_token: Option<&str>,
    ) -> Result<MappingEntriesPage> {
        let url = self.campaign_url(campaign, "offer-mapping-entries");
        debug!("GET {url} (page token {page_token:?})");

        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("limit", LIST_PAGE_LIMIT)]);
        if let Some(token) = page_token {
            request = request.query(&[("page_token", token)]);
        }

        let response = ensure_success(request.send().await?).await?;
        let page: MappingEntriesResponse = response.json().await?;
        Ok(page.result)
    }
}

#[async_trait]
impl MarketplaceClient for YandexMarketClient {
    fn kind(&self) -> MarketplaceKind {
        MarketplaceKind::YandexMarket
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
        let mut page_token: Option<String> = None;
        let mut seen_tokens: HashSet<String> = HashSet::new();

        loop {
            let page = self
                .fetch_mapping_page(campaign, page_token.as_deref())
                .await?;
            debug!(
                "[{}] fetched {} offer mappings",
                campaign.name,
                page.offer_mapping_entries.len()
            );
            offer_ids.extend(
                page.offer_mapping_entries
                    .into_iter()
                    .map(|entry| entry.offer.shop_sku),
            );

            let next = page.paging.next_page_token.filter(|t| !t.is_empty());
            match next {
                None => break,
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    warn!(
                        "[{}] page token {token} already visited, stopping pagination",
                        campaign.name
                    );
                    break;
                }
                Some(token) => page_token = Some(token),
            }
        }

        info!(
            "[{}] {} offers listed on Yandex Market",
            campaign.name,
            offer_ids.len()
        );
        Ok(offer_ids)
    }

    async fn submit_stock_updates(
        &self,
        batch: &[StockUpdate],
        campaign: &Campaign,
    ) -> Result<()> {
        let now = Utc::now();
        let request = StocksRequest {
            skus: batch
                .iter()
                .map(|s| SkuStock {
                    sku: &s.offer_id,
                    warehouse_id: s
                        .warehouse_id
                        .as_deref()
                        .or(campaign.warehouse_id.as_deref()),
                    items: [StockItem {
                        count: s.quantity,
                        kind: STOCK_TYPE_FIT,
                        updated_at: format_updated_at(s.updated_at.unwrap_or(now)),
                    }],
                })
                .collect(),
        };

        let url = self.campaign_url(campaign, "offers/stocks");
        debug!("PUT {url}");
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;
        ensure_success(response).await?;
        debug!("[{}] pushed {} stock records", campaign.name, batch.len());
        Ok(())
    }

    async fn submit_price_updates(
        &self,
        batch: &[PriceUpdate],
        campaign: &Campaign,
    ) -> Result<()> {
        let request = PricesRequest {
            offers: batch
                .iter()
                .map(|p| OfferPrice {
                    id: &p.offer_id,
                    price: PriceValue {
                        value: p.price,
                        currency_id: &p.currency,
                    },
                })
                .collect(),
        };

        let url = self.campaign_url(campaign, "offer-prices/updates");
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;
        ensure_success(response).await?;
        debug!("[{}] pushed {} price records", campaign.name, batch.len());
        Ok(())
    }
}

#[cfg(test)]
#[path = "yandex_tests.rs"]
mod tests;
