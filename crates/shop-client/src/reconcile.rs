//! Checking a rehydrated cart against the live catalog.
//!
//! A persisted cart can be days old. Before it is used again, every product
//! it references is looked up once; anything the catalog no longer has is
//! dropped. Lookups run concurrently and each failure is contained to its
//! own product, which is then treated as gone.

use std::collections::HashSet;

use futures::future::join_all;
use shop_commerce::{CartItem, ProductId};
use tracing::{debug, warn};

use crate::lookup::ProductLookup;
use crate::store::MountToken;

/// Items captured from a store, waiting to be checked.
#[derive(Debug, Clone)]
pub struct PendingReconciliation {
    token: MountToken,
    items: Vec<CartItem>,
}

impl PendingReconciliation {
    pub(crate) fn new(token: MountToken, items: Vec<CartItem>) -> Self {
        Self { token, items }
    }

    /// Items as they were when the snapshot was taken.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Distinct product ids in line order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        distinct_ids(&self.items)
    }
}

/// Result of checking a [`PendingReconciliation`].
#[derive(Debug, Clone)]
pub struct ReconciliationOutcome {
    token: MountToken,
    missing: HashSet<ProductId>,
}

impl ReconciliationOutcome {
    pub(crate) fn token(&self) -> MountToken {
        self.token
    }

    /// Products that were checked and could not be confirmed.
    pub fn missing(&self) -> &HashSet<ProductId> {
        &self.missing
    }
}

/// Items that survived a reconciliation, plus what was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub kept: Vec<CartItem>,
    /// Number of lines dropped.
    pub removed: usize,
    /// Products that could not be confirmed.
    pub missing: HashSet<ProductId>,
}

/// Confirms cart products still exist via a [`ProductLookup`].
#[derive(Debug, Clone)]
pub struct ProductReconciler<L> {
    lookup: L,
}

impl<L: ProductLookup> ProductReconciler<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Get the underlying lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Look every id up concurrently and return the ones confirmed to exist.
    pub async fn existing_ids(&self, ids: &[ProductId]) -> HashSet<ProductId> {
        let checks = ids.iter().map(|id| async move {
            match self.lookup.find_product(id).await {
                Ok(Some(_)) => Some(id.clone()),
                Ok(None) => {
                    debug!(product_id = %id, "product no longer exists");
                    None
                }
                Err(e) => {
                    warn!(product_id = %id, error = %e, "product lookup failed, treating as unavailable");
                    None
                }
            }
        });

        join_all(checks).await.into_iter().flatten().collect()
    }

    /// Filter `items` down to products the catalog still has, keeping their
    /// relative order.
    ///
    /// This is the stateless form, for callers that hold items rather than a
    /// store. [`check`](Self::check) runs the same pass over a store snapshot.
    pub async fn reconcile(&self, items: &[CartItem]) -> Reconciled {
        let ids = distinct_ids(items);
        let existing = self.existing_ids(&ids).await;
        let missing: HashSet<ProductId> = ids
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect();

        let kept: Vec<CartItem> = items
            .iter()
            .filter(|i| !missing.contains(&i.product.id))
            .cloned()
            .collect();
        let removed = items.len() - kept.len();
        Reconciled {
            kept,
            removed,
            missing,
        }
    }

    /// Check a store's pending snapshot.
    pub async fn check(&self, pending: PendingReconciliation) -> ReconciliationOutcome {
        let Reconciled { missing, .. } = self.reconcile(pending.items()).await;
        ReconciliationOutcome {
            token: pending.token,
            missing,
        }
    }
}

/// Text shown to the shopper after unavailable products were dropped.
pub fn removal_message(removed: usize) -> String {
    if removed == 1 {
        "1 product was removed from your cart because it is no longer available".to_string()
    } else {
        format!(
            "{removed} products were removed from your cart because they are no longer available"
        )
    }
}

fn distinct_ids(items: &[CartItem]) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|i| &i.product.id)
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect()
}
