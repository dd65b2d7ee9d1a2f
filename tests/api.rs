//! End-to-end tests over the full router, backed by the in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use restshop::{build_app, AppState, MediaUrl, MemoryStore, Settings};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct Shop {
    store: Arc<MemoryStore>,
    app: Router,
}

fn shop_with(settings: &Settings) -> Shop {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), MediaUrl::new("/media/"));
    let app = build_app(state, settings).expect("router assembles");
    Shop { store, app }
}

fn shop() -> Shop {
    shop_with(&Settings::default())
}

fn price(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// One product with a red and a blue unit; only the blue one has images.
fn seed_hat(store: &MemoryStore) -> i64 {
    let product = store.add_product("Hat", "Keeps the sun off");
    store.add_tag(product, "summer");
    let color = store.add_property("Color");
    let red = store.add_property_value(color, "red");
    let blue = store.add_property_value(color, "blue");
    let red_unit = store.add_unit(product, "HAT-RED", price("15.00"), 4);
    let blue_unit = store.add_unit(product, "HAT-BLUE", price("12.50"), 1);
    store.attach_value(red_unit, red);
    store.attach_value(blue_unit, blue);
    store.add_image(blue_unit, "hats/blue-side.jpg", false);
    store.add_image(blue_unit, "hats/blue-front.jpg", true);
    product
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_and_version_answer() {
    let shop = shop();
    let (status, body) = send(&shop.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&shop.app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (_, body) = send(&shop.app, "GET", "/version", None).await;
    assert_eq!(body["name"], "restshop");
}

#[tokio::test]
async fn schema_document_is_served() {
    let shop = shop();
    let (status, body) = send(&shop.app, "GET", "/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "restshop");
}

#[tokio::test]
async fn product_list_summarises_units() {
    let shop = shop();
    let id = seed_hat(&shop.store);
    shop.store.add_product("Scarf", "");

    let (status, body) = send(&shop.app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 2);
    assert_eq!(
        body["data"][0],
        json!({
            "id": id,
            "title": "Hat",
            "tags": ["summer"],
            "prices": {"min": "12.50", "max": "15.00"},
            "image": "/media/hats/blue-front.jpg"
        })
    );
    let scarf = &body["data"][1];
    assert_eq!(scarf["prices"], json!({"min": null, "max": null}));
    assert_eq!(scarf["image"], Value::Null);
    assert_eq!(scarf["tags"], json!([]));
}

#[tokio::test]
async fn product_detail_lists_every_unit() {
    let shop = shop();
    let id = seed_hat(&shop.store);

    let (status, body) = send(&shop.app, "GET", &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["title"], "Hat");
    assert_eq!(data["description"], "Keeps the sun off");
    assert_eq!(
        data["units"][0],
        json!({
            "sku": "HAT-RED",
            "price": "15.00",
            "properties": [{"name": "Color", "value": "red"}],
            "images": [],
            "num_in_stock": 4
        })
    );
    assert_eq!(
        data["units"][1]["images"],
        json!(["/media/hats/blue-side.jpg", "/media/hats/blue-front.jpg"])
    );
}

#[tokio::test]
async fn unknown_or_malformed_product_id() {
    let shop = shop();
    let (status, body) = send(&shop.app, "GET", "/products/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&shop.app, "GET", "/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tags_and_properties_are_listed() {
    let shop = shop();
    seed_hat(&shop.store);

    let (_, body) = send(&shop.app, "GET", "/tags", None).await;
    assert_eq!(body["data"], json!(["summer"]));

    let (_, body) = send(&shop.app, "GET", "/properties", None).await;
    assert_eq!(body["data"][0]["name"], "Color");
    assert_eq!(body["data"][0]["values"][1]["value"], "blue");
}

#[tokio::test]
async fn cart_accepts_line_within_stock() {
    let shop = shop();
    let id = seed_hat(&shop.store);

    let (status, body) = send(&shop.app, "POST", "/cart", Some(json!({"sku": "HAT-RED", "quantity": 4}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 4);
    assert_eq!(body["data"]["unit"]["product_id"], id);
    assert_eq!(body["data"]["unit"]["title"], "Hat");
    assert_eq!(body["data"]["unit"]["image"], Value::Null);
}

#[tokio::test]
async fn cart_quantity_defaults_to_one() {
    let shop = shop();
    seed_hat(&shop.store);

    let (status, body) = send(&shop.app, "POST", "/cart", Some(json!({"sku": "HAT-BLUE"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 1);
    assert_eq!(body["data"]["unit"]["image"], "/media/hats/blue-front.jpg");
}

#[tokio::test]
async fn cart_rejects_unknown_sku_and_overstock() {
    let shop = shop();
    seed_hat(&shop.store);

    let (status, body) = send(&shop.app, "POST", "/cart", Some(json!({"sku": "NOPE"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"], json!({"sku": ["Unit does not exist"]}));

    let (status, body) = send(&shop.app, "POST", "/cart", Some(json!({"sku": "HAT-BLUE", "quantity": 2}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"]["details"],
        json!({"quantity": ["There are not enough units in stock"]})
    );
}

#[tokio::test]
async fn cart_rejects_malformed_json() {
    let shop = shop();
    let req = Request::builder()
        .method("POST")
        .uri("/cart")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = shop.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_keeps_price_paid() {
    let shop = shop();
    seed_hat(&shop.store);

    let (status, body) = send(
        &shop.app,
        "POST",
        "/orders",
        Some(json!({
            "name": "Ada",
            "address": "1 Analytical Way",
            "phone": "555-0100",
            "units": [{"sku": "HAT-RED", "quantity": 2}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["units"][0]["status"], "Pending");
    assert_eq!(body["data"]["units"][0]["unit"]["price"], "15.00");

    assert!(shop.store.set_unit_price("HAT-RED", price("20.00")));

    let (_, body) = send(&shop.app, "GET", &format!("/orders/{}", order_id), None).await;
    let line = &body["data"]["units"][0];
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["unit"]["price"], "15.00");
    assert_eq!(line["unit"]["sku"], "HAT-RED");
    assert_eq!(body["data"]["name"], "Ada");

    let (_, body) = send(&shop.app, "GET", "/orders", None).await;
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["units_num"], 1);
}

#[tokio::test]
async fn order_with_bad_line_writes_nothing() {
    let shop = shop();
    seed_hat(&shop.store);

    let (status, body) = send(
        &shop.app,
        "POST",
        "/orders",
        Some(json!({
            "name": "Ada",
            "address": "1 Analytical Way",
            "phone": "555-0100",
            "units": [{"sku": "HAT-RED"}, {"sku": "NOPE"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["units[1].sku"], json!(["Unit does not exist"]));

    let (_, body) = send(&shop.app, "GET", "/orders", None).await;
    assert_eq!(body["meta"]["count"], 0);
}

#[tokio::test]
async fn user_sign_up_rejects_duplicate_email() {
    let shop = shop();
    let payload = json!({"email": "ada@example.com", "password": "difference-engine"});

    let (status, body) = send(&shop.app, "POST", "/users", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"], json!({"email": "ada@example.com"}));

    let (status, body) = send(&shop.app, "POST", "/users", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"]["details"]["email"],
        json!(["user with this email already exists."])
    );
    assert_eq!(shop.store.users().len(), 1);
    assert_ne!(shop.store.users()[0].password, "difference-engine");
}

#[tokio::test]
async fn sellers_share_one_staff_group() {
    let shop = shop();
    for (email, name) in [("a@shop.test", "Hats Ltd"), ("b@shop.test", "Scarves Co")] {
        let (status, body) = send(
            &shop.app,
            "POST",
            "/sellers",
            Some(json!({"email": email, "password": "s3cret-pass", "name": name, "address": "Market St"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["name"], name);
        assert_eq!(body["data"]["email"], email);
    }

    let groups = shop.store.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Staff");
    let permissions = shop.store.group_permissions(groups[0].id);
    assert_eq!(permissions.len(), restshop::service::STAFF_PERMISSIONS.len());
    for user in shop.store.users() {
        let member_of = shop.store.user_groups(user.id);
        assert_eq!(member_of, groups);
    }
}

#[tokio::test]
async fn api_prefix_nests_sub_apps_only() {
    let settings = Settings {
        api_prefix: "/api".to_string(),
        ..Settings::default()
    };
    let shop = shop_with(&settings);
    seed_hat(&shop.store);

    let (status, _) = send(&shop.app, "GET", "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&shop.app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&shop.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
