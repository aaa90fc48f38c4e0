//! End-to-end sync against mock marketplace APIs.
//!
//! Supplier feed: X (5), Y (>10), Z (1). Listed: X, Y, W.
//! Expected stock: X=5, Y=100, W=0 in batches [X, Y] and [W]; Z is not listed.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use watch_stock_sync::reconcile::batch_size;
use watch_stock_sync::sync::Operation;
use watch_stock_sync::{
    Campaign, MarketplaceKind, OzonClient, SupplierRecord, SyncOptions, SyncOrchestrator,
    YandexMarketClient,
};

fn supplier_feed() -> Vec<SupplierRecord> {
    [("X", "5", "1'490.00"), ("Y", ">10", "2'990.00"), ("Z", "1", "990.00")]
        .iter()
        .map(|(code, quantity, price)| SupplierRecord {
            code: code.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
        })
        .collect()
}

fn ozon_campaign() -> Campaign {
    Campaign {
        name: "ozon".to_string(),
        kind: MarketplaceKind::Ozon,
        id: "client-1".to_string(),
        warehouse_id: None,
    }
}

fn yandex_campaign(name: &str, id: &str) -> Campaign {
    Campaign {
        name: name.to_string(),
        kind: MarketplaceKind::YandexMarket,
        id: id.to_string(),
        warehouse_id: Some("55".to_string()),
    }
}

async fn mount_ozon_listing(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/product/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "items": [{ "offer_id": "X" }, { "offer_id": "Y" }, { "offer_id": "W" }],
                "total": 3,
                "last_id": "end"
            }
        })))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn ozon_sync_pushes_expected_batches() {
    let mock_server = MockServer::start().await;
    mount_ozon_listing(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1/product/import/stocks"))
        .and(body_json(json!({
            "stocks": [{ "offer_id": "X", "stock": 5 }, { "offer_id": "Y", "stock": 100 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/product/import/stocks"))
        .and(body_json(json!({ "stocks": [{ "offer_id": "W", "stock": 0 }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/product/import/prices"))
        .and(body_json(json!({
            "prices": [
                {
                    "auto_action_enabled": "UNKNOWN",
                    "currency_code": "RUB",
                    "offer_id": "X",
                    "old_price": "0",
                    "price": "1490"
                },
                {
                    "auto_action_enabled": "UNKNOWN",
                    "currency_code": "RUB",
                    "offer_id": "Y",
                    "old_price": "0",
                    "price": "2990"
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OzonClient::new(
        reqwest::Client::new(),
        "client-1".to_string(),
        "secret".to_string(),
    )
    .with_base_url(mock_server.uri())
    .with_batch_sizes(batch_size(2), batch_size(2));

    let mut orchestrator = SyncOrchestrator::new(SyncOptions::default());
    orchestrator.add_campaign(ozon_campaign(), Arc::new(client));

    let report = orchestrator.run(&supplier_feed()).await;

    assert!(report.is_success(), "{:?}", report.outcomes);
    let summary = report.summaries().next().unwrap();
    assert_eq!(summary.stock_updates, 3);
    assert_eq!(summary.in_stock, 2);
    assert_eq!(summary.stock_batches, 2);
    assert_eq!(summary.price_updates, 2);
}

#[tokio::test]
async fn failing_yandex_campaign_does_not_stop_ozon() {
    let mock_server = MockServer::start().await;
    mount_ozon_listing(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1/product/import/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/product/import/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // FBS lists fine but rejects its stock; DBS succeeds.
    for campaign_id in ["1001", "1002"] {
        Mock::given(method("GET"))
            .and(path(format!("/campaigns/{campaign_id}/offer-mapping-entries")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "paging": {},
                    "offerMappingEntries": [
                        { "offer": { "shopSku": "X" } },
                        { "offer": { "shopSku": "W" } }
                    ]
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("PUT"))
        .and(path("/campaigns/1001/offers/stocks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/campaigns/1001/offer-prices/updates"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/campaigns/1002/offers/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/campaigns/1002/offer-prices/updates"))
        .and(body_json(json!({
            "offers": [{ "id": "X", "price": { "value": 1490, "currencyId": "RUR" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ozon = OzonClient::new(reqwest::Client::new(), "client-1".to_string(), "k".to_string())
        .with_base_url(mock_server.uri());
    let yandex = Arc::new(
        YandexMarketClient::new(reqwest::Client::new(), "t".to_string())
            .with_base_url(mock_server.uri()),
    );

    let mut orchestrator = SyncOrchestrator::new(SyncOptions::default());
    orchestrator.add_campaign(ozon_campaign(), Arc::new(ozon));
    orchestrator.add_campaign(yandex_campaign("yandex-fbs", "1001"), yandex.clone());
    orchestrator.add_campaign(yandex_campaign("yandex-dbs", "1002"), yandex);

    let report = orchestrator.run(&supplier_feed()).await;

    assert!(!report.is_success());
    let mut succeeded: Vec<&str> = report.summaries().map(|s| s.campaign.as_str()).collect();
    succeeded.sort_unstable();
    assert_eq!(succeeded, vec!["ozon", "yandex-dbs"]);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.campaign, "yandex-fbs");
    assert_eq!(failure.marketplace, MarketplaceKind::YandexMarket);
    assert_eq!(failure.operation, Operation::SubmitStocks);
    assert_eq!(failure.batch.map(|b| b.index), Some(0));
}
