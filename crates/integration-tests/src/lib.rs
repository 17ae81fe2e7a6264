//! Integration tests for Bistro.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bistro-integration-tests
//! ```
//!
//! Each [`TestContext`] starts two servers on ephemeral ports: a
//! [`MockBackend`] standing in for the Catalog and Order Services, and a real
//! storefront pointed at it with a throwaway data directory. Nothing external
//! is required.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bistro_storefront::config::{ApiConfig, StorefrontConfig};
use bistro_storefront::state::AppState;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

/// Creation time reported for every mock order.
pub const ORDER_CREATED_AT: &str = "2026-10-19T18:30:00Z";

/// The catalog served by the mock backend.
///
/// - `1` Pretzel, 29.00, category 1
/// - `2` Esfiha, 8.00 on promotion for 6.50, category 2, Coalhada +3.50
/// - `3` Suco, 9.00 with a bogus "promotion" of 12.00, category 2
#[must_use]
pub fn catalog_fixture() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "titulo": "Pretzel",
            "preco": 29,
            "image_url": "https://img.bistro.test/pretzel.jpg",
            "categoria_id": 1
        }),
        json!({
            "id": 2,
            "titulo": "Esfiha",
            "descricao": "Esfiha aberta de carne",
            "preco": "8.00",
            "preco_promocional": 6.5,
            "categoria_id": 2,
            "acompanhamentos": [{"nome": "Coalhada", "preco": 3.5}]
        }),
        json!({
            "id": "3",
            "titulo": "Suco",
            "preco": 9,
            "preco_promocional": 12,
            "categoria_id": "2"
        }),
    ]
}

#[derive(Debug, Default)]
struct MockState {
    orders: Vec<Value>,
    fail_orders: bool,
}

/// In-process stand-in for the Catalog and Order Services.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Start the mock on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .route("/api/produtos", get(list_products))
            .route("/api/produtos/{id}", get(get_product))
            .route("/api/categorias", get(list_categories))
            .route("/api/pedidos", axum::routing::post(create_order))
            .route("/api/pedidos/{id}", get(get_order))
            .with_state(Arc::clone(&state));

        let addr = serve(app).await;
        Self { addr, state }
    }

    /// Base URL of the mock API.
    ///
    /// # Panics
    ///
    /// Panics if the address does not form a URL.
    #[must_use]
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/", self.addr)).expect("valid mock URL")
    }

    /// Order payloads received so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the mock state lock is poisoned.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.state.lock().expect("mock state").orders.clone()
    }

    /// Make order submissions fail with a 500 until reset.
    ///
    /// # Panics
    ///
    /// Panics if the mock state lock is poisoned.
    pub fn fail_orders(&self, fail: bool) {
        self.state.lock().expect("mock state").fail_orders = fail;
    }
}

type Shared = State<Arc<Mutex<MockState>>>;

#[derive(Debug, Deserialize)]
struct ProductFilter {
    categoria_id: Option<String>,
}

fn id_of(value: &Value, field: &str) -> String {
    match &value[field] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn list_products(Query(filter): Query<ProductFilter>) -> Json<Vec<Value>> {
    let products = catalog_fixture()
        .into_iter()
        .filter(|p| {
            filter
                .categoria_id
                .as_ref()
                .is_none_or(|c| &id_of(p, "categoria_id") == c)
        })
        .collect();
    Json(products)
}

async fn get_product(Path(id): Path<String>) -> Response {
    catalog_fixture()
        .into_iter()
        .find(|p| id_of(p, "id") == id)
        .map_or_else(
            || (StatusCode::NOT_FOUND, "produto não encontrado").into_response(),
            |p| Json(p).into_response(),
        )
}

async fn list_categories() -> Json<Value> {
    Json(json!([
        {"id": 1, "nome": "Salgados"},
        {"id": 2, "nome": "Árabe"}
    ]))
}

async fn create_order(State(state): Shared, Json(order): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state");
    if state.fail_orders {
        return (StatusCode::INTERNAL_SERVER_ERROR, "banco indisponível").into_response();
    }
    state.orders.push(order);
    let id = 980 + state.orders.len();
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn get_order(State(state): Shared, Path(id): Path<String>) -> Response {
    let state = state.lock().expect("mock state");
    let index = id
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(981))
        .filter(|&i| i < state.orders.len());
    match index {
        Some(_) => Json(json!({
            "id": id,
            "status": "em_preparo",
            "total": "87.00",
            "criado_em": ORDER_CREATED_AT
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}

/// A storefront wired to a [`MockBackend`], plus a cookie-keeping client.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub backend: MockBackend,
    data_dir: TempDir,
}

impl TestContext {
    /// Start the mock backend and a storefront in front of it.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot start.
    pub async fn new() -> Self {
        let backend = MockBackend::start().await;
        let data_dir = TempDir::new().expect("Failed to create data dir");

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://localhost".to_string(),
            data_dir: data_dir.path().to_path_buf(),
            api: ApiConfig {
                base_url: backend.api_url(),
                token: None,
                catalog_cache_ttl: Duration::from_secs(60),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
            log_json: false,
        };

        let addr = serve(bistro_storefront::app(AppState::new(config))).await;

        Self {
            client: new_client(),
            storefront_url: format!("http://{addr}"),
            backend,
            data_dir,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Root of the storefront's cart snapshots.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.path().to_path_buf()
    }

    /// GET `path` and decode the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn get_json(&self, client: &Client, path: &str) -> (reqwest::StatusCode, Value) {
        let response = client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed");
        decode(response).await
    }

    /// Send `body` to `path` with `method` and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn send_json(
        &self,
        client: &Client,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> (reqwest::StatusCode, Value) {
        let mut request = client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("request failed");
        decode(response).await
    }
}

/// A fresh client with its own cookie jar, i.e. a new visitor.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

async fn decode(response: reqwest::Response) -> (reqwest::StatusCode, Value) {
    let status = response.status();
    let body = response.json::<Value>().await.expect("JSON body");
    (status, body)
}

/// Read a decimal the storefront serialized as a JSON string.
///
/// # Panics
///
/// Panics if `value` is not a decimal string.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal string")).expect("decimal")
}
