//! Product existence lookups against the authoritative catalog.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Deserialize;
use shop_commerce::{CategoryRef, Currency, Money, Product, ProductId};
use shop_data::{FetchClient, FetchError};
use thiserror::Error;
use tracing::instrument;

/// Errors from a single product lookup.
///
/// Callers that reconcile a cart treat every one of these as "not found".
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("product lookup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("product {id} has an invalid payload: {reason}")]
    InvalidProduct { id: String, reason: String },

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a product id to the current product, if it still exists.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, LookupError>;
}

#[async_trait]
impl<T: ProductLookup + ?Sized> ProductLookup for Arc<T> {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, LookupError> {
        (**self).find_product(id).await
    }
}

/// Looks products up through the storefront REST API (`GET /products/{id}`).
#[derive(Debug, Clone)]
pub struct ApiProductLookup {
    client: FetchClient,
    currency: Currency,
}

impl ApiProductLookup {
    pub fn new(client: FetchClient) -> Self {
        Self {
            client,
            currency: Currency::default(),
        }
    }

    /// Currency the API quotes bare decimal prices in.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

#[async_trait]
impl ProductLookup for ApiProductLookup {
    #[instrument(skip(self, id), fields(product_id = %id))]
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, LookupError> {
        // Ids come back out of local storage, so never splice arbitrary
        // text into the request path.
        if !is_plain_id(id.as_str()) {
            tracing::debug!("rejecting malformed product id");
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("/products/{}", id.as_str()))
            .send()
            .await?;
        if response.is_not_found() {
            return Ok(None);
        }

        let dto: ProductDto = response.error_for_status()?.json()?;
        dto.into_product(self.currency).map(Some)
    }
}

fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Product as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(alias = "countInStock")]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<CategoryDto>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "isFeatured")]
    pub featured: bool,
}

/// The API sends either a bare category id or a populated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryDto {
    Id(String),
    Populated {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl ProductDto {
    /// Convert to a domain snapshot, pricing in `currency`.
    pub fn into_product(self, currency: Currency) -> Result<Product, LookupError> {
        let invalid = |reason: &str| LookupError::InvalidProduct {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.price < 0.0 {
            return Err(invalid("negative price"));
        }
        let price = Money::from_decimal(self.price, currency)
            .ok_or_else(|| invalid("price out of range"))?;

        let category = match self.category {
            Some(CategoryDto::Id(id)) => CategoryRef::new(id),
            Some(CategoryDto::Populated { id, name }) => CategoryRef { id: id.into(), name },
            None => CategoryRef::default(),
        };

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price,
            stock: self.stock.max(0),
            category,
            image: self.image,
            featured: self.featured,
        })
    }
}

/// Catalog held in memory. Clones share the same contents.
///
/// Ids marked with [`fail`](Self::fail) return an error instead of a
/// result, standing in for a lookup that timed out.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<CatalogState>>,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<ProductId, Product>,
    failing: HashSet<ProductId>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    pub fn insert(&self, product: Product) {
        if let Ok(mut state) = self.inner.write() {
            state.products.insert(product.id.clone(), product);
        }
    }

    pub fn remove(&self, id: &ProductId) {
        if let Ok(mut state) = self.inner.write() {
            state.products.remove(id);
        }
    }

    /// Make lookups of `id` fail.
    pub fn fail(&self, id: impl Into<ProductId>) {
        if let Ok(mut state) = self.inner.write() {
            state.failing.insert(id.into());
        }
    }
}

#[async_trait]
impl ProductLookup for InMemoryCatalog {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, LookupError> {
        let state = self
            .inner
            .read()
            .map_err(|_| LookupError::Unavailable("catalog lock poisoned".to_string()))?;
        if state.failing.contains(id) {
            return Err(LookupError::Unavailable(format!("lookup of {id} failed")));
        }
        Ok(state.products.get(id).cloned())
    }
}
