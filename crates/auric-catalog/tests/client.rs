//! Integration tests for `CatalogClient` against a wiremock Admin API.

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{
    body_partial_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auric_catalog::{CatalogClient, CatalogError, ThemeSettings};
use auric_core::AppConfig;
use auric_core::RateSnapshot;

fn test_config() -> AppConfig {
    AppConfig {
        shop_url: "test-shop.myshopify.com".to_owned(),
        access_token: "shpat_test_token".to_owned(),
        theme_id: Some("111".to_owned()),
        rate_feed_api_key: None,
        currency: "INR".to_owned(),
        log_level: "info".to_owned(),
        request_timeout_secs: 30,
        user_agent: "auric/0.1 (price-sync)".to_owned(),
        page_limit: 250,
        inter_request_delay_ms: 0,
        max_retries: 0,
        retry_backoff_base_secs: 0,
    }
}

fn test_client(base_url: &str) -> CatalogClient {
    CatalogClient::with_base_url(&test_config(), base_url)
        .expect("client construction should not fail")
}

fn rate_marker_metafields() -> serde_json::Value {
    json!({ "metafields": [
        { "id": 1, "namespace": "pricing", "key": "gold_rate", "value": "7000", "type": "number_decimal" },
        { "id": 2, "namespace": "pricing", "key": "silver_rate", "value": "100", "type": "number_decimal" },
    ] })
}

async fn mount_product_metafields(server: &MockServer, product_id: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{product_id}/metafields.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn lists_only_products_with_rate_markers_across_pages() {
    let server = MockServer::start().await;

    let page1 = json!({ "products": [
        { "id": 10, "title": "Gold Ring", "handle": "gold-ring",
          "variants": [{ "id": 100, "title": "22K", "option1": "22K Yellow Gold", "price": "100.00" }] },
        { "id": 11, "title": "Plain Tee", "handle": "plain-tee",
          "variants": [{ "id": 110, "title": "M", "option1": "M", "price": "20.00" }] },
    ] });
    let page2 = json!({ "products": [
        { "id": 12, "title": "Silver Chain", "handle": "silver-chain",
          "variants": [{ "id": 120, "title": "Silver", "option1": "Silver", "price": "55.00" }] },
    ] });

    let next_link = format!(
        r#"<{}/products.json?limit=250&page_info=CUR2>; rel="next""#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("limit", "250"))
        .and(query_param_is_missing("page_info"))
        .and(header("X-Shopify-Access-Token", "shpat_test_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&page1)
                .insert_header("Link", next_link.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page_info", "CUR2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page2))
        .expect(1)
        .mount(&server)
        .await;

    mount_product_metafields(&server, 10, rate_marker_metafields()).await;
    mount_product_metafields(&server, 11, json!({ "metafields": [] })).await;
    mount_product_metafields(&server, 12, rate_marker_metafields()).await;

    let products = test_client(&server.uri())
        .list_priced_products()
        .await
        .expect("listing should succeed");

    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![10, 12]);
    // Metafields ride along with each kept product.
    assert_eq!(products[0].metafields.len(), 2);
    assert_eq!(products[0].variants[0].price, Decimal::new(10000, 2));
}

#[tokio::test]
async fn update_variant_price_puts_price_as_string() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/variants/100.json"))
        .and(body_partial_json(
            json!({ "variant": { "id": 100, "price": "24358" } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "variant": {} })))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .update_variant_price(100, Decimal::new(24358, 0))
        .await
        .expect("price update should succeed");
}

#[tokio::test]
async fn upsert_creates_metafield_when_absent() {
    let server = MockServer::start().await;
    mount_product_metafields(&server, 10, json!({ "metafields": [] })).await;
    Mock::given(method("POST"))
        .and(path("/products/10/metafields.json"))
        .and(body_partial_json(json!({ "metafield": {
            "namespace": "pricing", "key": "gold_rate",
            "value": "7000", "type": "number_decimal",
        } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "metafield": {} })))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .upsert_product_metafield(10, "pricing", "gold_rate", "7000", "number_decimal")
        .await
        .expect("upsert should succeed");
}

#[tokio::test]
async fn upsert_updates_existing_metafield_by_id() {
    let server = MockServer::start().await;
    mount_product_metafields(&server, 10, rate_marker_metafields()).await;
    Mock::given(method("PUT"))
        .and(path("/products/10/metafields/1.json"))
        .and(body_partial_json(
            json!({ "metafield": { "id": 1, "value": "7100" } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "metafield": {} })))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .upsert_product_metafield(10, "pricing", "gold_rate", "7100", "number_decimal")
        .await
        .expect("upsert should succeed");
}

#[tokio::test]
async fn theme_settings_parses_nested_asset_document() {
    let server = MockServer::start().await;
    let settings_doc = json!({ "current": {
        "making_charges": "5",
        "markup_percentage": 12.5,
        "logo_width": 200,
    } });
    Mock::given(method("GET"))
        .and(path("/themes/111/assets.json"))
        .and(query_param("asset[key]", "config/settings_data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "asset": {
            "key": "config/settings_data.json",
            "value": settings_doc.to_string(),
        } })))
        .mount(&server)
        .await;

    let settings = test_client(&server.uri())
        .theme_settings("111")
        .await
        .expect("settings should fetch");

    assert_eq!(settings.making_charges_pct, Decimal::new(5, 0));
    assert_eq!(settings.markup_pct, Decimal::new(125, 1));
    // Absent GST falls back to the 3% default.
    assert_eq!(settings.gst_pct, Decimal::new(3, 0));
}

#[tokio::test]
async fn theme_settings_defaults_when_current_section_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/themes/111/assets.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "asset": {
            "key": "config/settings_data.json",
            "value": "{}",
        } })))
        .mount(&server)
        .await;

    let settings = test_client(&server.uri())
        .theme_settings("111")
        .await
        .expect("settings should fetch");
    assert_eq!(settings, ThemeSettings::default());
}

#[tokio::test]
async fn update_theme_settings_preserves_unrelated_keys() {
    let server = MockServer::start().await;
    let settings_doc = json!({ "current": { "logo_width": 200 }, "presets": {} });
    Mock::given(method("GET"))
        .and(path("/themes/111/assets.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "asset": {
            "key": "config/settings_data.json",
            "value": settings_doc.to_string(),
        } })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/themes/111/assets.json"))
        .and(body_partial_json(
            json!({ "asset": { "key": "config/settings_data.json" } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "asset": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let rates = RateSnapshot {
        gold_rate_per_gram: Decimal::new(7000, 0),
        silver_rate_per_gram: Decimal::new(925, 1),
        currency: "INR".to_owned(),
    };
    test_client(&server.uri())
        .update_theme_settings("111", &rates)
        .await
        .expect("theme update should succeed");

    // The PUT body carries the merged document: new rates plus the keys that
    // were already there.
    let requests = server.received_requests().await.expect("requests recorded");
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("a PUT was sent");
    let body: serde_json::Value = serde_json::from_slice(&put.body).expect("PUT body is JSON");
    let value = body["asset"]["value"].as_str().expect("asset value is a string");
    let merged: serde_json::Value = serde_json::from_str(value).expect("asset value is JSON");
    assert_eq!(merged["current"]["gold_rate"], json!(7000.0));
    assert_eq!(merged["current"]["silver_rate"], json!(92.5));
    assert_eq!(merged["current"]["logo_width"], json!(200));
    assert!(merged.get("presets").is_some());
}

#[tokio::test]
async fn missing_variant_surfaces_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/variants/404/metafields.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .variant_metafields(404)
        .await
        .expect_err("404 must surface");
    assert!(matches!(err, CatalogError::NotFound { .. }));
}
