//! Cart and catalog API tests against a mock backend.

use bistro_integration_tests::{TestContext, decimal, new_client};
use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let resp = ctx
        .client
        .get(ctx.url("/health"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let ctx = TestContext::new().await;
    let (status, cart) = ctx.get_json(&ctx.client, "/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"], json!([]));
    assert_eq!(cart["item_count"], 0);
    assert_eq!(decimal(&cart["subtotal"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_adding_same_product_twice_merges_lines() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .send_json(
            &ctx.client,
            Method::POST,
            "/cart/items",
            Some(json!({"product_id": "1", "quantity": 1, "notes": "sem sal"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, cart) = ctx
        .send_json(
            &ctx.client,
            Method::POST,
            "/cart/items",
            Some(json!({"product_id": 1, "quantity": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Pretzel");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(items[0]["notes"], "sem sal");
    assert_eq!(decimal(&cart["subtotal"]), Decimal::new(87, 0));
    assert_eq!(cart["subtotal_display"], "R$ 87,00");

    let (_, count) = ctx.get_json(&ctx.client, "/cart/count").await;
    assert_eq!(count["count"], 3);
}

#[tokio::test]
async fn test_promotional_price_and_accompaniments() {
    let ctx = TestContext::new().await;

    let (status, cart) = ctx
        .send_json(
            &ctx.client,
            Method::POST,
            "/cart/items",
            Some(json!({
                "product_id": "2",
                "quantity": 2,
                "accompaniments": {"Coalhada": 1}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let line = &cart["items"][0];
    // 8.00 + 3.50 regular, 6.50 + 3.50 promotional
    assert_eq!(decimal(&line["unit_price"]), Decimal::new(115, 1));
    assert_eq!(decimal(&line["effective_price"]), Decimal::new(10, 0));
    assert_eq!(line["accompaniments"], json!({"Coalhada": 1}));
    assert_eq!(decimal(&cart["subtotal"]), Decimal::new(20, 0));
}

#[tokio::test]
async fn test_unknown_accompaniment_is_rejected() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx
        .send_json(
            &ctx.client,
            Method::POST,
            "/cart/items",
            Some(json!({"product_id": "2", "accompaniments": {"Ketchup": 1}})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("Ketchup"));

    let (_, count) = ctx.get_json(&ctx.client, "/cart/count").await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::new().await;
    let (status, _) = ctx
        .send_json(
            &ctx.client,
            Method::POST,
            "/cart/items",
            Some(json!({"product_id": "404"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_quantity_and_remove() {
    let ctx = TestContext::new().await;
    for product_id in ["1", "2"] {
        ctx.send_json(
            &ctx.client,
            Method::POST,
            "/cart/items",
            Some(json!({"product_id": product_id})),
        )
        .await;
    }

    let (_, cart) = ctx
        .send_json(
            &ctx.client,
            Method::PATCH,
            "/cart/items/1",
            Some(json!({"quantity": 4})),
        )
        .await;
    assert_eq!(cart["items"][0]["quantity"], 4);
    assert_eq!(cart["item_count"], 5);

    let (_, cart) = ctx
        .send_json(
            &ctx.client,
            Method::PATCH,
            "/cart/items/1",
            Some(json!({"quantity": 0})),
        )
        .await;
    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "2");

    let (_, cart) = ctx
        .send_json(&ctx.client, Method::DELETE, "/cart/items/missing", None)
        .await;
    assert_eq!(cart["item_count"], 1);

    let (_, cart) = ctx
        .send_json(&ctx.client, Method::DELETE, "/cart/items/2", None)
        .await;
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
async fn test_clear_cart() {
    let ctx = TestContext::new().await;
    ctx.send_json(
        &ctx.client,
        Method::POST,
        "/cart/items",
        Some(json!({"product_id": "1", "quantity": 2})),
    )
    .await;

    let (status, cart) = ctx
        .send_json(&ctx.client, Method::DELETE, "/cart", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 0);

    let (_, count) = ctx.get_json(&ctx.client, "/cart/count").await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_visitors_have_separate_carts() {
    let ctx = TestContext::new().await;
    let other = new_client();

    ctx.send_json(
        &ctx.client,
        Method::POST,
        "/cart/items",
        Some(json!({"product_id": "1"})),
    )
    .await;

    let (_, mine) = ctx.get_json(&ctx.client, "/cart/count").await;
    let (_, theirs) = ctx.get_json(&other, "/cart/count").await;
    assert_eq!(mine["count"], 1);
    assert_eq!(theirs["count"], 0);
}

#[tokio::test]
async fn test_cart_is_persisted_as_snapshot() {
    let ctx = TestContext::new().await;
    ctx.send_json(
        &ctx.client,
        Method::POST,
        "/cart/items",
        Some(json!({"product_id": "1", "quantity": 2})),
    )
    .await;

    let snapshots: Vec<_> = std::fs::read_dir(ctx.data_dir())
        .expect("data dir")
        .filter_map(Result::ok)
        .map(|entry| entry.path().join("bistro.cart.json"))
        .filter(|path| path.exists())
        .collect();
    assert_eq!(snapshots.len(), 1);

    let snapshot = std::fs::read_to_string(&snapshots[0]).expect("snapshot");
    let lines: serde_json::Value = serde_json::from_str(&snapshot).expect("snapshot JSON");
    assert_eq!(lines[0]["id"], "1");
    assert_eq!(lines[0]["quantity"], 2);
    assert_eq!(lines[0]["unitPrice"], "29");
}

#[tokio::test]
async fn test_product_listing() {
    let ctx = TestContext::new().await;

    let (status, products) = ctx.get_json(&ctx.client, "/products").await;
    assert_eq!(status, StatusCode::OK);
    let products = products.as_array().expect("products");
    assert_eq!(products.len(), 3);

    // A "promotion" above the regular price is dropped
    let suco = products.iter().find(|p| p["id"] == "3").expect("suco");
    assert!(suco["promotional_price"].is_null());

    let (_, arabic) = ctx.get_json(&ctx.client, "/products?category=2").await;
    let ids: Vec<_> = arabic
        .as_array()
        .expect("products")
        .iter()
        .map(|p| p["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("2"), json!("3")]);

    let (status, product) = ctx.get_json(&ctx.client, "/products/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["title"], "Esfiha");
    assert_eq!(product["accompaniments"][0]["name"], "Coalhada");

    let (_, categories) = ctx.get_json(&ctx.client, "/categories").await;
    assert_eq!(categories[1]["name"], "Árabe");
}
