//! Runtime configuration from environment variables.
//!
//! | variable            | meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `SELLER_TOKEN`      | Ozon `Api-Key`                            |
//! | `CLIENT_ID`         | Ozon `Client-Id`                          |
//! | `MARKET_TOKEN`      | Yandex Market OAuth token                 |
//! | `FBS_ID`            | Yandex Market FBS campaign id             |
//! | `WAREHOUSE_FBS_ID`  | warehouse id for the FBS campaign         |
//! | `DBS_ID`            | Yandex Market DBS campaign id             |
//! | `WAREHOUSE_DBS_ID`  | warehouse id for the DBS campaign         |
//! | `SUPPLIER_URL`      | supplier archive URL override             |
//! | `HTTP_TIMEOUT_SECS` | per-request timeout, default 30 seconds   |

use std::time::Duration;

use crate::error::{Result, SyncError};
use crate::marketplace::{Campaign, MarketplaceKind};
use crate::supplier::DEFAULT_SUPPLIER_URL;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Ozon seller credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OzonConfig {
    pub client_id: String,
    pub api_key: String,
}

/// Yandex Market token and the campaigns it manages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YandexConfig {
    pub token: String,
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub ozon: Option<OzonConfig>,
    pub yandex: Option<YandexConfig>,
    pub supplier_url: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let ozon = match (get("CLIENT_ID"), get("SELLER_TOKEN")) {
            (Some(client_id), Some(api_key)) => Some(OzonConfig { client_id, api_key }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(SyncError::Config(
                    "CLIENT_ID is set but SELLER_TOKEN is not".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(SyncError::Config(
                    "SELLER_TOKEN is set but CLIENT_ID is not".to_string(),
                ))
            }
        };

        let yandex = match get("MARKET_TOKEN") {
            Some(token) => {
                let mut campaigns = Vec::new();
                for (label, id_var, warehouse_var) in [
                    ("fbs", "FBS_ID", "WAREHOUSE_FBS_ID"),
                    ("dbs", "DBS_ID", "WAREHOUSE_DBS_ID"),
                ] {
                    let Some(id) = get(id_var) else {
                        continue;
                    };
                    let warehouse_id = get(warehouse_var).ok_or_else(|| {
                        SyncError::Config(format!("{id_var} is set but {warehouse_var} is not"))
                    })?;
                    campaigns.push(Campaign {
                        name: format!("yandex-{label}"),
                        kind: MarketplaceKind::YandexMarket,
                        id,
                        warehouse_id: Some(warehouse_id),
                    });
                }
                if campaigns.is_empty() {
                    return Err(SyncError::Config(
                        "MARKET_TOKEN is set but neither FBS_ID nor DBS_ID is".to_string(),
                    ));
                }
                Some(YandexConfig { token, campaigns })
            }
            None => None,
        };

        if ozon.is_none() && yandex.is_none() {
            return Err(SyncError::Config(
                "no marketplace configured: set CLIENT_ID/SELLER_TOKEN or MARKET_TOKEN".to_string(),
            ));
        }

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(SyncError::Config(format!(
                        "HTTP_TIMEOUT_SECS must be a positive number of seconds, got '{raw}'"
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            ozon,
            yandex,
            supplier_url: get("SUPPLIER_URL").unwrap_or_else(|| DEFAULT_SUPPLIER_URL.to_string()),
            http_timeout,
        })
    }

    /// The Ozon account as a campaign, if configured
    pub fn ozon_campaign(&self) -> Option<Campaign> {
        self.ozon.as_ref().map(|ozon| Campaign {
            name: "ozon".to_string(),
            kind: MarketplaceKind::Ozon,
            id: ozon.client_id.clone(),
            warehouse_id: None,
        })
    }
}
