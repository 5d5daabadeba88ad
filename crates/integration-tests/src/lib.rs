//! Integration tests for the storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefront-cart-integration-tests
//! ```
//!
//! No external services are needed: [`StubCatalog`] serves the stock and
//! product endpoints from an in-process axum server on an ephemeral port,
//! and the real [`HttpCatalog`](storefront_cart::HttpCatalog) talks to it
//! over loopback.
//!
//! # Test Categories
//!
//! - `cart_http` - Cart operations through the HTTP lookup client
//! - `cart_persistence` - File store mirroring across manager restarts

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// A request seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
struct StubState {
    products: HashMap<i32, Value>,
    stock: HashMap<i32, i64>,
    failing: bool,
    malformed: bool,
    bare_stock: bool,
    requests: Vec<RecordedRequest>,
}

/// Scriptable stand-in for the storefront lookup service.
///
/// Clones share state, so a test can keep one handle to change stock or
/// inject failures while the server runs.
#[derive(Debug, Clone, Default)]
pub struct StubCatalog {
    state: Arc<Mutex<StubState>>,
}

impl StubCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product and its stock count.
    #[must_use]
    pub fn with_product(self, id: i32, title: &str, price: f64, stock: i64) -> Self {
        {
            let mut state = self.lock();
            state.products.insert(
                id,
                json!({
                    "id": id,
                    "title": title,
                    "price": price,
                    "image": format!("https://cdn.example.com/products/{id}.jpg"),
                }),
            );
            state.stock.insert(id, stock);
        }
        self
    }

    pub fn set_stock(&self, id: i32, amount: i64) {
        self.lock().stock.insert(id, amount);
    }

    /// Answer every request with 503.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Answer every request with an unparsable 200 body.
    pub fn set_malformed(&self, malformed: bool) {
        self.lock().malformed = malformed;
    }

    /// Send stock bodies as `{ "amount": n }` without the `id` field.
    pub fn set_bare_stock(&self, bare: bool) {
        self.lock().bare_stock = bare;
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Start serving under `/api` on an ephemeral loopback port.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn serve(self) -> std::io::Result<StubServer> {
        let app = Router::new().nest(
            "/api",
            Router::new()
                .route("/stock/{id}", get(stock))
                .route("/products/{id}", get(product))
                .with_state(self),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(StubServer { addr, handle })
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(&self, path: String, headers: &HeaderMap, body: Option<Value>) -> Response {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            path,
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(String::from),
        });

        if state.failing {
            return (StatusCode::SERVICE_UNAVAILABLE, "stock service down").into_response();
        }
        if state.malformed {
            return ([(header::CONTENT_TYPE, "application/json")], "{\"id\":").into_response();
        }
        match body {
            Some(body) => Json(body).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

async fn stock(
    State(stub): State<StubCatalog>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let body = {
        let state = stub.lock();
        state.stock.get(&id).map(|amount| {
            if state.bare_stock {
                json!({ "amount": amount })
            } else {
                json!({ "id": id, "amount": amount })
            }
        })
    };
    stub.respond(format!("/api/stock/{id}"), &headers, body)
}

async fn product(
    State(stub): State<StubCatalog>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let body = stub.lock().products.get(&id).cloned();
    stub.respond(format!("/api/products/{id}"), &headers, body)
}

/// Running stub server; stops when dropped.
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Base URL of the lookup API (`http://127.0.0.1:<port>/api/`).
    ///
    /// # Panics
    ///
    /// Never in practice: a loopback socket address always forms a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/", self.addr)).expect("loopback URL is valid")
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
