//! Stock checks against live catalog data.
//!
//! Cart snapshots go stale. These helpers fetch current product data before
//! acting on it: once when adding by id, and once for every line right
//! before an order is submitted. The server still has the final word.

use futures::future::join_all;
use serde::Serialize;
use shop_cache::KvBackend;
use shop_commerce::cart::validate_quantity_update;
use shop_commerce::{CommerceError, ProductId, StockError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::lookup::{LookupError, ProductLookup};
use crate::notify::Notifier;
use crate::store::CartStore;

/// Why adding a product by id failed.
#[derive(Error, Debug)]
pub enum AddError {
    #[error("This product is no longer available")]
    NotFound(ProductId),

    #[error("Could not check availability: {0}")]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Cart(#[from] CommerceError),
}

/// Look `product_id` up and add `quantity` units of the live product.
///
/// Every failure is also sent to the store's notifier.
pub async fn add_product_by_id<B, N, L>(
    store: &mut CartStore<B, N>,
    lookup: &L,
    product_id: &ProductId,
    quantity: i64,
) -> Result<(), AddError>
where
    B: KvBackend,
    N: Notifier,
    L: ProductLookup + ?Sized,
{
    let product = match lookup.find_product(product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            let err = AddError::NotFound(product_id.clone());
            store.notifier().error(err.to_string());
            return Err(err);
        }
        Err(e) => {
            warn!(%product_id, error = %e, "lookup before add failed");
            let err = AddError::Lookup(e);
            store.notifier().error(err.to_string());
            return Err(err);
        }
    };

    // add_to_cart reports its own rejections.
    store.add_to_cart(product, quantity)?;
    Ok(())
}

/// A cart line that should block checkout.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutIssue {
    #[error("{name} is no longer available")]
    Unavailable { product_id: ProductId, name: String },

    #[error("{message}")]
    InsufficientStock {
        product_id: ProductId,
        quantity: i64,
        stock: i64,
        message: String,
    },

    #[error("Could not verify availability of {name}")]
    Unverified { product_id: ProductId, name: String },

    #[error("{message}")]
    Rejected { product_id: ProductId, message: String },
}

impl CheckoutIssue {
    /// Get the product the issue is about.
    pub fn product_id(&self) -> &ProductId {
        match self {
            Self::Unavailable { product_id, .. }
            | Self::InsufficientStock { product_id, .. }
            | Self::Unverified { product_id, .. }
            | Self::Rejected { product_id, .. } => product_id,
        }
    }
}

/// Result of re-checking a cart before submitting an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckoutReview {
    pub issues: Vec<CheckoutIssue>,
}

impl CheckoutReview {
    /// Check if the cart can go to checkout.
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Re-fetch every line, refresh its snapshot, and check its quantity
/// against live stock.
///
/// Quantities are never changed here; each problem is reported as an issue
/// and sent to the notifier.
pub async fn revalidate_for_checkout<B, N, L>(
    store: &mut CartStore<B, N>,
    lookup: &L,
) -> CheckoutReview
where
    B: KvBackend,
    N: Notifier,
    L: ProductLookup + ?Sized,
{
    let lines: Vec<(ProductId, String, i64)> = store
        .items()
        .iter()
        .map(|i| (i.product.id.clone(), i.product.name.clone(), i.quantity))
        .collect();

    let results = join_all(lines.iter().map(|(id, _, _)| lookup.find_product(id))).await;

    let mut issues = Vec::new();
    for ((product_id, name, quantity), result) in lines.into_iter().zip(results) {
        let product = match result {
            Ok(Some(product)) => product,
            Ok(None) => {
                issues.push(CheckoutIssue::Unavailable { product_id, name });
                continue;
            }
            Err(e) => {
                warn!(%product_id, error = %e, "checkout lookup failed");
                issues.push(CheckoutIssue::Unverified { product_id, name });
                continue;
            }
        };

        let stock = product.stock;
        if let Err(e) = validate_quantity_update(&product, quantity) {
            issues.push(stock_issue(product_id.clone(), quantity, stock, e));
        }
        if let Err(e) = store.refresh_snapshot(product) {
            issues.push(CheckoutIssue::Rejected {
                product_id,
                message: e.to_string(),
            });
        }
    }

    debug!(issues = issues.len(), "checkout revalidated");
    for issue in &issues {
        store.notifier().error(issue.to_string());
    }
    CheckoutReview { issues }
}

fn stock_issue(product_id: ProductId, quantity: i64, stock: i64, err: StockError) -> CheckoutIssue {
    CheckoutIssue::InsufficientStock {
        product_id,
        quantity,
        stock,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::InMemoryCatalog;
    use crate::notify::RecordingNotifier;
    use shop_cache::{Cache, MemoryBackend};
    use shop_commerce::{Currency, Money, Product};

    fn product(id: &str, cents: i64, stock: i64) -> Product {
        Product::new(id, format!("Item {id}"), Money::new(cents, Currency::USD), stock)
    }

    fn store() -> (CartStore<MemoryBackend, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let store = CartStore::mount(Cache::in_memory(), notifier.clone());
        (store, notifier)
    }

    #[tokio::test]
    async fn test_add_by_id_uses_live_product() {
        let catalog = InMemoryCatalog::with_products([product("a", 500, 3)]);
        let (mut store, _) = store();

        add_product_by_id(&mut store, &catalog, &"a".into(), 2)
            .await
            .unwrap();
        assert_eq!(store.total_items(), 2);
        assert_eq!(store.total_price(), Money::new(1000, Currency::USD));
    }

    #[tokio::test]
    async fn test_add_by_id_missing_product() {
        let (mut store, notifier) = store();
        let err = add_product_by_id(&mut store, &InMemoryCatalog::new(), &"zz".into(), 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AddError::NotFound(_)));
        assert_eq!(notifier.errors(), vec!["This product is no longer available".to_string()]);
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_by_id_stock_rejection_notifies_once() {
        let catalog = InMemoryCatalog::with_products([product("a", 500, 0)]);
        let (mut store, notifier) = store();

        let err = add_product_by_id(&mut store, &catalog, &"a".into(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AddError::Cart(_)));
        assert_eq!(notifier.errors(), vec!["Item a is out of stock".to_string()]);
    }

    #[tokio::test]
    async fn test_revalidate_refreshes_prices_and_flags_problems() {
        let catalog = InMemoryCatalog::with_products([
            product("a", 500, 10),
            product("b", 700, 10),
            product("c", 900, 10),
        ]);
        let (mut store, notifier) = store();
        store.add_to_cart(product("a", 500, 10), 4).unwrap();
        store.add_to_cart(product("b", 700, 10), 1).unwrap();
        store.add_to_cart(product("c", 900, 10), 1).unwrap();
        notifier.drain();

        // Live data moves on: a now has 2 left, b got cheaper, c is gone.
        catalog.insert(product("a", 500, 2));
        catalog.insert(product("b", 600, 10));
        catalog.remove(&"c".into());

        let review = revalidate_for_checkout(&mut store, &catalog).await;
        assert!(!review.is_ready());
        assert_eq!(review.issues.len(), 2);
        assert_eq!(review.issues[0].to_string(), "Only 2 of Item a available in stock");
        assert_eq!(
            review.issues[1],
            CheckoutIssue::Unavailable {
                product_id: "c".into(),
                name: "Item c".into()
            }
        );

        // Quantities untouched, snapshot refreshed.
        assert_eq!(store.cart().quantity_of(&"a".into()), 4);
        assert_eq!(
            store.cart().get(&"b".into()).unwrap().product.price,
            Money::new(600, Currency::USD)
        );
        assert_eq!(notifier.errors().len(), 2);
    }

    #[tokio::test]
    async fn test_revalidate_clean_cart_is_ready() {
        let catalog = InMemoryCatalog::with_products([product("a", 500, 10)]);
        let (mut store, notifier) = store();
        store.add_to_cart(product("a", 500, 10), 1).unwrap();
        notifier.drain();

        let review = revalidate_for_checkout(&mut store, &catalog).await;
        assert!(review.is_ready());
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_revalidate_lookup_failure_is_unverified() {
        let catalog = InMemoryCatalog::with_products([product("a", 500, 10)]);
        catalog.fail("a");
        let (mut store, _) = store();
        store.add_to_cart(product("a", 500, 10), 1).unwrap();

        let review = revalidate_for_checkout(&mut store, &catalog).await;
        assert!(matches!(review.issues[0], CheckoutIssue::Unverified { .. }));
        assert_eq!(review.issues[0].product_id().as_str(), "a");
    }
}
