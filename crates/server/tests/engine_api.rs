//! End-to-end tests for the order engine API.
//!
//! These tests require a `PostgreSQL` database:
//!
//! ```bash
//! export TRADECART_TEST_DATABASE_URL=postgres://localhost/tradecart_test
//! cargo test -p tradecart-server -- --ignored
//! ```
//!
//! Each test spins the full axum app up on an ephemeral port, seeds its
//! own account, token, and catalog rows directly through sqlx, and talks
//! to the server over HTTP like a real client. Tests never share
//! accounts, so they can run concurrently against one database.

use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use tradecart_core::{CatalogItemId, OrderId, OrderLineId, OrderStatus};
use tradecart_server::config::EngineConfig;
use tradecart_server::db::orders::{CheckoutAddress, LineSnapshot};
use tradecart_server::db::{OrderRepository, RepositoryError};
use tradecart_server::models::NewAddress;
use tradecart_server::routes;
use tradecart_server::state::AppState;

struct TestContext {
    client: Client,
    base_url: String,
    pool: PgPool,
}

impl TestContext {
    /// Connect, migrate, and serve the app on an ephemeral port.
    async fn new() -> Self {
        let database_url = std::env::var("TRADECART_TEST_DATABASE_URL")
            .expect("TRADECART_TEST_DATABASE_URL must be set for ignored tests");

        let pool = PgPool::connect(&database_url)
            .await
            .expect("connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("run migrations");

        let config = EngineConfig {
            database_url: SecretString::from(database_url),
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let app = routes::app(AppState::new(config, pool.clone()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            pool,
        }
    }

    /// Insert an account and an API token for it.
    async fn account(&self, approved: bool, admin: bool, multiplier: &str) -> String {
        let email = format!("{}@test.tradecart.dev", Uuid::new_v4());
        let role = if admin { "ADMIN" } else { "CUSTOMER" };
        let multiplier: Decimal = multiplier.parse().expect("decimal literal");

        let account_id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO trade.account (email, approved, role, price_multiplier)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&email)
        .bind(approved)
        .bind(role)
        .bind(multiplier)
        .fetch_one(&self.pool)
        .await
        .expect("insert account");

        let token = format!("test-{}", Uuid::new_v4().simple());
        sqlx::query("INSERT INTO trade.api_token (token, account_id) VALUES ($1, $2)")
            .bind(&token)
            .bind(account_id)
            .execute(&self.pool)
            .await
            .expect("insert token");

        token
    }

    /// Insert a catalog item; `base_price = None` makes it market-priced.
    async fn item(&self, base_price: Option<&str>) -> i64 {
        let price: Option<Decimal> = base_price.map(|p| p.parse().expect("decimal literal"));
        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO trade.catalog_item (name, base_price, image)
            VALUES ($1, $2, 'https://cdn.tradecart.dev/items/test.jpg')
            RETURNING id
            ",
        )
        .bind(format!("Test item {}", Uuid::new_v4()))
        .bind(price)
        .fetch_one(&self.pool)
        .await
        .expect("insert catalog item");
        i64::from(id)
    }

    async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("request")
    }

    async fn send(
        &self,
        method: reqwest::Method,
        token: &str,
        path: &str,
        body: &Value,
    ) -> reqwest::Response {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("request")
    }

    async fn post(&self, token: &str, path: &str, body: &Value) -> reqwest::Response {
        self.send(reqwest::Method::POST, token, path, body).await
    }

    async fn put(&self, token: &str, path: &str, body: &Value) -> reqwest::Response {
        self.send(reqwest::Method::PUT, token, path, body).await
    }
}

async fn json_body(resp: reqwest::Response) -> Value {
    resp.json().await.expect("JSON body")
}

fn test_address() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "street1": "1 Engine Way",
        "city": "London",
        "zip": "EC1",
        "country": "GB",
    })
}

fn test_address_fields() -> NewAddress {
    NewAddress {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        company: String::new(),
        street1: "1 Engine Way".to_owned(),
        street2: String::new(),
        city: "London".to_owned(),
        state: String::new(),
        zip: "EC1".to_owned(),
        country: "GB".to_owned(),
        email: String::new(),
        phone: String::new(),
    }
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_health_is_open() {
    let ctx = TestContext::new().await;
    let resp = ctx
        .client
        .get(format!("{}/health", ctx.base_url))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_cart_requires_token() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(format!("{}/cart", ctx.base_url))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = ctx.get("not-a-real-token", "/cart").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_admin_routes_reject_customers() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;

    let resp = ctx
        .put(&token, "/admin/orders/1/status", &json!({"status": "CONFIRMED"}))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_first_cart_read_creates_draft() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;

    let body = json_body(ctx.get(&token, "/cart").await).await;
    assert!(body["order_number"].as_str().expect("number").starts_with("TC-"));
    assert_eq!(body["lines"], json!([]));
    assert_eq!(body["total"], json!("0"));

    // Second read returns the same draft
    let again = json_body(ctx.get(&token, "/cart").await).await;
    assert_eq!(again["order_id"], body["order_id"]);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_add_item_overwrites_quantity() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    let body = json_body(
        ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item, "quantity": 2}))
            .await,
    )
    .await;
    assert_eq!(body["lines"][0]["quantity"], json!(2));

    // Re-adding sets, not sums
    let body = json_body(
        ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item, "quantity": 5}))
            .await,
    )
    .await;
    assert_eq!(body["lines"][0]["quantity"], json!(5));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_add_unknown_item_is_404() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;

    let resp = ctx
        .post(&token, "/cart/items", &json!({"catalog_item_id": 999_999}))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_batch_add_increments_and_is_not_idempotent() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    // Duplicate ids in one batch both land on the same line
    let payload = json!({"item_ids": [item, item], "quantities": [1, 2]});
    let body = json_body(ctx.post(&token, "/cart/items/batch", &payload).await).await;
    assert_eq!(body["lines"][0]["quantity"], json!(3));

    // A retry of the same batch doubles it
    let body = json_body(ctx.post(&token, "/cart/items/batch", &payload).await).await;
    assert_eq!(body["lines"][0]["quantity"], json!(6));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_batch_quantities_scalar_and_omitted() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let a = ctx.item(Some("1.00")).await;
    let b = ctx.item(Some("2.00")).await;

    // Omitted quantities default to one each
    let body = json_body(
        ctx.post(&token, "/cart/items/batch", &json!({"item_ids": [a, b]}))
            .await,
    )
    .await;
    assert_eq!(body["lines"][0]["quantity"], json!(1));
    assert_eq!(body["lines"][1]["quantity"], json!(1));

    // A scalar applies to every item
    let body = json_body(
        ctx.post(&token, "/cart/items/batch", &json!({"item_ids": [a, b], "quantities": 4}))
            .await,
    )
    .await;
    assert_eq!(body["lines"][0]["quantity"], json!(5));
    assert_eq!(body["lines"][1]["quantity"], json!(5));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_cart_prices_follow_multiplier() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.5").await;
    let priced = ctx.item(Some("25.00")).await;
    let market = ctx.item(None).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": priced, "quantity": 2}))
        .await;
    let body = json_body(
        ctx.post(&token, "/cart/items", &json!({"catalog_item_id": market, "quantity": 4}))
            .await,
    )
    .await;

    assert_eq!(body["lines"][0]["unit_price"], json!("37.50"));
    assert_eq!(body["lines"][0]["line_total"], json!("75.00"));
    // Market-priced lines show no price and contribute zero
    assert_eq!(body["lines"][1]["unit_price"], Value::Null);
    assert_eq!(body["total"], json!("75.00"));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_update_quantity_zero_deletes_line() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    let body = json_body(
        ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item, "quantity": 2}))
            .await,
    )
    .await;
    let line_id = body["lines"][0]["line_id"].as_i64().expect("line id");

    let body = json_body(
        ctx.send(
            reqwest::Method::PATCH,
            &token,
            &format!("/cart/items/{line_id}"),
            &json!({"quantity": 0}),
        )
        .await,
    )
    .await;
    assert_eq!(body["lines"], json!([]));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_foreign_line_is_forbidden() {
    let ctx = TestContext::new().await;
    let owner = ctx.account(true, false, "1.0").await;
    let intruder = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    let body = json_body(
        ctx.post(&owner, "/cart/items", &json!({"catalog_item_id": item}))
            .await,
    )
    .await;
    let line_id = body["lines"][0]["line_id"].as_i64().expect("line id");

    let resp = ctx
        .send(
            reqwest::Method::PATCH,
            &intruder,
            &format!("/cart/items/{line_id}"),
            &json!({"quantity": 3}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_placed_lines_reject_cart_edits() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    let body = json_body(
        ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item, "quantity": 2}))
            .await,
    )
    .await;
    let line_id = body["lines"][0]["line_id"].as_i64().expect("line id");

    ctx.post(&token, "/checkout", &json!({"address": test_address()}))
        .await;

    // The line now belongs to a PENDING order; cart edits no longer apply
    let resp = ctx
        .send(
            reqwest::Method::PATCH,
            &token,
            &format!("/cart/items/{line_id}"),
            &json!({"quantity": 5}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = ctx
        .send(
            reqwest::Method::DELETE,
            &token,
            &format!("/cart/items/{line_id}"),
            &json!({}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_checkout_freezes_prices() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.5").await;
    let item = ctx.item(Some("25.00")).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item, "quantity": 2}))
        .await;
    let body = json_body(
        ctx.post(&token, "/checkout", &json!({"address": test_address()}))
            .await,
    )
    .await;

    assert_eq!(body["status"], json!("PENDING"));
    assert_eq!(body["lines"][0]["price"], json!("37.50"));
    assert_eq!(body["total"], json!("75.00"));
    let order_id = body["id"].as_i64().expect("order id");

    // A later catalog change does not touch the placed line
    sqlx::query("UPDATE trade.catalog_item SET base_price = 99.00 WHERE id = $1")
        .bind(i32::try_from(item).expect("item id"))
        .execute(&ctx.pool)
        .await
        .expect("update catalog");

    let body = json_body(ctx.get(&token, &format!("/orders/{order_id}")).await).await;
    assert_eq!(body["lines"][0]["price"], json!("37.50"));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_checkout_leaves_market_price_null() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "2.0").await;
    let market = ctx.item(None).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": market, "quantity": 3}))
        .await;
    let body = json_body(
        ctx.post(&token, "/checkout", &json!({"address": test_address()}))
            .await,
    )
    .await;

    assert_eq!(body["lines"][0]["price"], Value::Null);
    assert_eq!(body["total"], json!("0"));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_checkout_empty_cart_is_conflict() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;

    let resp = ctx
        .post(&token, "/checkout", &json!({"address": test_address()}))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_checkout_requires_approval() {
    let ctx = TestContext::new().await;
    let token = ctx.account(false, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item}))
        .await;
    let resp = ctx
        .post(&token, "/checkout", &json!({"address": test_address()}))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_checkout_needs_exactly_one_address() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item}))
        .await;

    let resp = ctx.post(&token, "/checkout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = ctx
        .post(
            &token,
            "/checkout",
            &json!({"delivery_address_id": 1, "address": test_address()}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_checkout_saves_address_to_book() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item}))
        .await;
    ctx.post(
        &token,
        "/checkout",
        &json!({"address": test_address(), "save_address": true}),
    )
    .await;

    let book = json_body(ctx.get(&token, "/addresses").await).await;
    let entries = book.as_array().expect("address array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["first_name"], json!("Ada"));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_checkout_rejects_lines_added_after_snapshot() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let first = ctx.item(Some("5.00")).await;
    let second = ctx.item(Some("7.00")).await;

    let cart = json_body(
        ctx.post(&token, "/cart/items", &json!({"catalog_item_id": first}))
            .await,
    )
    .await;
    let order_id = OrderId::new(
        i32::try_from(cart["order_id"].as_i64().expect("order id")).expect("order id"),
    );
    let line_id = OrderLineId::new(
        i32::try_from(cart["lines"][0]["line_id"].as_i64().expect("line id")).expect("line id"),
    );

    // A snapshot set computed while the cart held a single line...
    let snapshots = vec![LineSnapshot {
        line_id,
        price: Some("5.00".parse().expect("decimal literal")),
        name: "Test item".to_owned(),
        image: None,
    }];

    // ...goes stale when another request lands a second line first
    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": second}))
        .await;

    let address = test_address_fields();
    let repo = OrderRepository::new(&ctx.pool);
    let err = repo
        .checkout(
            order_id,
            &snapshots,
            CheckoutAddress::New {
                fields: &address,
                account_id: None,
            },
            None,
        )
        .await
        .expect_err("stale snapshot set must not place the order");
    assert!(matches!(err, RepositoryError::Conflict(_)));

    // Everything rolled back: still a draft, no snapshot written
    let order = repo.find_by_id(order_id).await.expect("query").expect("order");
    assert_eq!(order.status, OrderStatus::Cart);
    let (name,): (Option<String>,) =
        sqlx::query_as("SELECT name_snapshot FROM trade.order_line WHERE id = $1")
            .bind(line_id.as_i32())
            .fetch_one(&ctx.pool)
            .await
            .expect("line row");
    assert_eq!(name, None);

    // Once the order is placed for real, the guarded insert writes nothing
    ctx.post(&token, "/checkout", &json!({"address": test_address()}))
        .await;
    let third = ctx.item(Some("9.00")).await;
    let written = repo
        .upsert_line_overwrite(
            order_id,
            CatalogItemId::new(i32::try_from(third).expect("item id")),
            1,
        )
        .await
        .expect("guarded insert");
    assert_eq!(written, 0);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_cancel_pending_order() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item}))
        .await;
    let placed = json_body(
        ctx.post(&token, "/checkout", &json!({"address": test_address()}))
            .await,
    )
    .await;
    let order_id = placed["id"].as_i64().expect("order id");

    let body = json_body(
        ctx.post(&token, &format!("/orders/{order_id}/cancel"), &json!({}))
            .await,
    )
    .await;
    assert_eq!(body["status"], json!("CANCELLED"));

    // Only PENDING orders can be cancelled
    let resp = ctx
        .post(&token, &format!("/orders/{order_id}/cancel"), &json!({}))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_cancel_convert_to_cart_reprices_live() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("10.00")).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item, "quantity": 2}))
        .await;
    let placed = json_body(
        ctx.post(&token, "/checkout", &json!({"address": test_address()}))
            .await,
    )
    .await;
    let order_id = placed["id"].as_i64().expect("order id");

    // Checkout froze price and display snapshots onto the line
    let (price, name, image) =
        sqlx::query_as::<_, (Option<Decimal>, Option<String>, Option<String>)>(
            "SELECT price, name_snapshot, image_snapshot FROM trade.order_line WHERE order_id = $1",
        )
        .bind(i32::try_from(order_id).expect("order id"))
        .fetch_one(&ctx.pool)
        .await
        .expect("placed line");
    assert_eq!(price, Some("10.00".parse().expect("decimal literal")));
    assert!(name.is_some());
    assert!(image.is_some());

    let body = json_body(
        ctx.post(
            &token,
            &format!("/orders/{order_id}/cancel"),
            &json!({"convert_to_cart": true}),
        )
        .await,
    )
    .await;
    assert_eq!(body["status"], json!("CART"));

    // Converting back clears the display snapshots but keeps the stored
    // price and quantity
    let (price, name, image) =
        sqlx::query_as::<_, (Option<Decimal>, Option<String>, Option<String>)>(
            "SELECT price, name_snapshot, image_snapshot FROM trade.order_line WHERE order_id = $1",
        )
        .bind(i32::try_from(order_id).expect("order id"))
        .fetch_one(&ctx.pool)
        .await
        .expect("reverted line");
    assert_eq!(price, Some("10.00".parse().expect("decimal literal")));
    assert_eq!(name, None);
    assert_eq!(image, None);

    // The revived cart prices from the current catalog
    sqlx::query("UPDATE trade.catalog_item SET base_price = 12.00 WHERE id = $1")
        .bind(i32::try_from(item).expect("item id"))
        .execute(&ctx.pool)
        .await
        .expect("update catalog");

    let cart = json_body(ctx.get(&token, "/cart").await).await;
    assert_eq!(cart["order_id"].as_i64(), Some(order_id));
    assert_eq!(cart["lines"][0]["unit_price"], json!("12.00"));
    assert_eq!(cart["lines"][0]["quantity"], json!(2));
}

// ============================================================================
// Orders (history)
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_order_history_excludes_cart() {
    let ctx = TestContext::new().await;
    let token = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    ctx.post(&token, "/cart/items", &json!({"catalog_item_id": item}))
        .await;
    ctx.post(&token, "/checkout", &json!({"address": test_address()}))
        .await;
    // A fresh draft after checkout
    ctx.get(&token, "/cart").await;

    let body = json_body(ctx.get(&token, "/orders").await).await;
    let orders = body.as_array().expect("order array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], json!("PENDING"));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_foreign_order_is_404() {
    let ctx = TestContext::new().await;
    let owner = ctx.account(true, false, "1.0").await;
    let intruder = ctx.account(true, false, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    ctx.post(&owner, "/cart/items", &json!({"catalog_item_id": item}))
        .await;
    let placed = json_body(
        ctx.post(&owner, "/checkout", &json!({"address": test_address()}))
            .await,
    )
    .await;
    let order_id = placed["id"].as_i64().expect("order id");

    let resp = ctx.get(&intruder, &format!("/orders/{order_id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_admin_sets_any_status() {
    let ctx = TestContext::new().await;
    let customer = ctx.account(true, false, "1.0").await;
    let admin = ctx.account(true, true, "1.0").await;
    let item = ctx.item(Some("5.00")).await;

    ctx.post(&customer, "/cart/items", &json!({"catalog_item_id": item}))
        .await;
    let placed = json_body(
        ctx.post(&customer, "/checkout", &json!({"address": test_address()}))
            .await,
    )
    .await;
    let order_id = placed["id"].as_i64().expect("order id");

    let body = json_body(
        ctx.put(
            &admin,
            &format!("/admin/orders/{order_id}/status"),
            &json!({"status": "DELIVERED"}),
        )
        .await,
    )
    .await;
    assert_eq!(body["status"], json!("DELIVERED"));

    // The write is unguarded: walking backwards is accepted
    let body = json_body(
        ctx.put(
            &admin,
            &format!("/admin/orders/{order_id}/status"),
            &json!({"status": "CONFIRMED"}),
        )
        .await,
    )
    .await;
    assert_eq!(body["status"], json!("CONFIRMED"));

    // Unknown statuses are not
    let resp = ctx
        .put(
            &admin,
            &format!("/admin/orders/{order_id}/status"),
            &json!({"status": "TELEPORTED"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TRADECART_TEST_DATABASE_URL)"]
async fn test_admin_resolves_market_price() {
    let ctx = TestContext::new().await;
    let customer = ctx.account(true, false, "1.0").await;
    let admin = ctx.account(true, true, "1.0").await;
    let priced = ctx.item(Some("5.00")).await;
    let market = ctx.item(None).await;

    ctx.post(&customer, "/cart/items", &json!({"catalog_item_id": priced}))
        .await;
    ctx.post(
        &customer,
        "/cart/items",
        &json!({"catalog_item_id": market, "quantity": 3}),
    )
    .await;
    let placed = json_body(
        ctx.post(&customer, "/checkout", &json!({"address": test_address()}))
            .await,
    )
    .await;
    let order_id = placed["id"].as_i64().expect("order id");
    assert_eq!(placed["total"], json!("5.00"));
    let market_line = placed["lines"]
        .as_array()
        .expect("lines")
        .iter()
        .find(|l| l["price"].is_null())
        .expect("market line")["id"]
        .as_i64()
        .expect("line id");

    let body = json_body(
        ctx.put(
            &admin,
            &format!("/admin/orders/{order_id}/lines/{market_line}/price"),
            &json!({"price": "10.00"}),
        )
        .await,
    )
    .await;
    assert_eq!(body["total"], json!("35.00"));

    // A line id outside the order is rejected
    let resp = ctx
        .put(
            &admin,
            &format!("/admin/orders/{order_id}/lines/999999/price"),
            &json!({"price": "1.00"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
