//! Supplier stock feed: download, unzip and parse the watch stock sheet.

mod archive;
mod sheet;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::http::ensure_success;

pub use archive::extract_workbook;
pub use sheet::{
    records_from_rows, records_from_workbook, CODE_COLUMN, PRICE_COLUMN, QUANTITY_COLUMN,
};

/// Supplier stock archive published by the distributor
pub const DEFAULT_SUPPLIER_URL: &str = "https://timeworld.ru/upload/files/ostatki.zip";

/// One row of the supplier stock sheet, as the supplier wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierRecord {
    /// Supplier code, used as the marketplace offer id
    pub code: String,
    /// Stock bucket: `">10"`, `"1"` or a count
    pub quantity: String,
    /// Retail price, e.g. `"12'990.00 руб."`
    pub price: String,
}

/// Source of the current supplier stock.
#[async_trait]
pub trait SupplierFeed: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<SupplierRecord>>;
}

/// Downloads the zipped stock sheet over HTTP.
pub struct RemoteFeed {
    client: Client,
    url: String,
}

impl RemoteFeed {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SupplierFeed for RemoteFeed {
    async fn fetch_records(&self) -> Result<Vec<SupplierRecord>> {
        log::info!("Downloading supplier stock from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let response = ensure_success(response).await?;
        let archive = response.bytes().await?;

        log::info!("Downloaded {} bytes", archive.len());

        let workbook = extract_workbook(&archive)?;
        records_from_workbook(workbook)
    }
}

/// Reads a stock sheet from disk, either the `.zip` as published or the
/// bare `.xls`.
pub struct LocalFeed {
    path: PathBuf,
}

impl LocalFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_archive(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }
}

#[async_trait]
impl SupplierFeed for LocalFeed {
    async fn fetch_records(&self) -> Result<Vec<SupplierRecord>> {
        log::info!("Reading supplier stock from {}", self.path.display());

        let bytes = tokio::fs::read(&self.path).await?;
        let workbook = if Self::is_archive(&self.path) {
            extract_workbook(&bytes)?
        } else {
            bytes
        };
        records_from_workbook(workbook)
    }
}

#[cfg(test)]
#[path = "supplier_tests.rs"]
mod tests;
