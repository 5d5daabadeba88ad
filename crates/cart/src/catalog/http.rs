//! REST client for the storefront stock/product lookup service.
//!
//! # Endpoints
//!
//! - `GET {base}/stock/{id}` → `{ "amount": 3 }` (an `id` field, if sent, is ignored)
//! - `GET {base}/products/{id}` → `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use storefront_cart_core::{Product, ProductId, StockInfo};

use super::{CatalogService, LookupError};
use crate::config::{CatalogConfig, with_trailing_slash};

/// Body of the stock endpoint. The product is identified by the path.
#[derive(Debug, Deserialize)]
struct StockBody {
    amount: u32,
}

/// HTTP client for the lookup service.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalog {
    /// Create a new lookup client.
    ///
    /// # Errors
    ///
    /// Returns error if the API token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let auth_value = format!("Bearer {}", token.expose_secret());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| LookupError::Parse(format!("Invalid API token format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(config.base_url.clone()),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, resource: &str, product_id: ProductId) -> Result<Url, LookupError> {
        self.base_url
            .join(&format!("{resource}/{product_id}"))
            .map_err(|e| LookupError::Parse(format!("Invalid endpoint URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        product_id: ProductId,
    ) -> Result<T, LookupError> {
        let url = self.endpoint(resource, product_id)?;
        debug!(%url, "Catalog request");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(format!("{resource} {product_id}")));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }
}

impl CatalogService for HttpCatalog {
    #[instrument(skip(self))]
    async fn stock(&self, product_id: ProductId) -> Result<StockInfo, LookupError> {
        let body: StockBody = self.get_json("stock", product_id).await?;
        Ok(StockInfo::new(product_id, body.amount))
    }

    #[instrument(skip(self))]
    async fn product(&self, product_id: ProductId) -> Result<Product, LookupError> {
        self.get_json("products", product_id).await
    }
}
