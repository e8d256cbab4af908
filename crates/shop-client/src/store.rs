//! The cart state container.
//!
//! [`CartStore`] owns the in-session [`Cart`], writes it to the local
//! key-value store after every successful mutation, and reads it back when
//! mounted. Validation failures go to the [`Notifier`] and leave the cart
//! untouched; storage failures are logged and otherwise ignored, since the
//! persisted copy is a convenience rather than a system of record.

use std::sync::atomic::{AtomicU64, Ordering};

use shop_cache::{Cache, CacheError, KvBackend};
use shop_commerce::{Cart, CartItem, CommerceError, Money, Product, ProductId};
use tracing::{debug, info, warn};

use crate::lookup::ProductLookup;
use crate::notify::Notifier;
use crate::reconcile::{
    removal_message, PendingReconciliation, ProductReconciler, ReconciliationOutcome,
};

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "cart";

static NEXT_MOUNT: AtomicU64 = AtomicU64::new(1);

/// Identifies one mounted store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountToken(u64);

impl MountToken {
    pub(crate) fn next() -> Self {
        Self(NEXT_MOUNT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Single source of truth for the shopper's cart during a session.
pub struct CartStore<B: KvBackend, N: Notifier> {
    cache: Cache<B>,
    key: String,
    notifier: N,
    cart: Cart,
    drawer_open: bool,
    token: MountToken,
    mounted: bool,
    reconciliation_started: bool,
}

impl<B: KvBackend, N: Notifier> CartStore<B, N> {
    /// Mount a store, rehydrating from [`DEFAULT_STORAGE_KEY`].
    pub fn mount(cache: Cache<B>, notifier: N) -> Self {
        Self::mount_with_key(cache, DEFAULT_STORAGE_KEY, notifier)
    }

    /// Mount a store persisted under `key`.
    ///
    /// A missing or unreadable value yields an empty cart; nothing is
    /// reported to the shopper.
    pub fn mount_with_key(cache: Cache<B>, key: impl Into<String>, notifier: N) -> Self {
        let key = key.into();
        let cart = rehydrate(&cache, &key);
        Self {
            cache,
            key,
            notifier,
            cart,
            drawer_open: false,
            token: MountToken::next(),
            mounted: true,
            reconciliation_started: false,
        }
    }

    /// Get the current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Get the cart's lines in display order.
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Get the number of units across all lines.
    pub fn total_items(&self) -> i64 {
        self.cart.total_items()
    }

    /// Get the cart total.
    pub fn total_price(&self) -> Money {
        self.cart.total_price()
    }

    /// Get the notifier messages are sent to.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Get the key the cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Add `quantity` units of `product`.
    ///
    /// On failure the reason has already been sent to the notifier and the
    /// cart is unchanged.
    pub fn add_to_cart(&mut self, product: Product, quantity: i64) -> Result<(), CommerceError> {
        let name = product.name.clone();
        let product_id = product.id.clone();

        match self.cart.add(product, quantity) {
            Ok(()) => {
                debug!(%product_id, quantity, "added to cart");
                self.persist();
                self.notifier.success(format!("Added {name} to cart"));
                Ok(())
            }
            Err(e) => {
                debug!(%product_id, quantity, error = %e, "add to cart rejected");
                self.notifier.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: Product) -> Result<(), CommerceError> {
        self.add_to_cart(product, 1)
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        let removed = self.cart.remove(product_id);
        self.persist();
        removed
    }

    /// Set a line to exactly `quantity` units; zero or less removes it.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return Ok(());
        }

        match self.cart.set_quantity(product_id, quantity) {
            Ok(true) => {
                self.persist();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => {
                debug!(%product_id, quantity, error = %e, "quantity update rejected");
                self.notifier.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist();
    }

    /// Show the cart drawer.
    pub fn open_drawer(&mut self) {
        self.drawer_open = true;
    }

    /// Hide the cart drawer.
    pub fn close_drawer(&mut self) {
        self.drawer_open = false;
    }

    /// Flip the cart drawer between open and closed.
    pub fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
    }

    /// Check if the cart drawer is open.
    pub fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    /// Replace a line's product snapshot with live data, keeping quantity.
    pub(crate) fn refresh_snapshot(&mut self, product: Product) -> Result<bool, CommerceError> {
        let refreshed = self.cart.refresh_product(product)?;
        if refreshed {
            self.persist();
        }
        Ok(refreshed)
    }

    /// Check if the store is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Mark the store as gone. Reconciliation results that arrive later are
    /// dropped.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Snapshot the rehydrated items for checking against the catalog.
    ///
    /// Returns `None` once reconciliation has been started for this mount,
    /// or if the store is unmounted.
    pub fn begin_reconciliation(&mut self) -> Option<PendingReconciliation> {
        if self.reconciliation_started || !self.mounted {
            return None;
        }
        self.reconciliation_started = true;
        Some(PendingReconciliation::new(self.token, self.cart.items().to_vec()))
    }

    /// Drop every checked product the catalog no longer has, then persist.
    ///
    /// Returns `false` without touching the cart when the outcome belongs to
    /// another mount or this store has been unmounted.
    pub fn finish_reconciliation(&mut self, outcome: ReconciliationOutcome) -> bool {
        if !self.mounted || outcome.token() != self.token {
            debug!("discarding reconciliation for a stale mount");
            return false;
        }

        let removed = self.cart.remove_products(outcome.missing());
        if removed > 0 {
            info!(removed, "removed unavailable products from cart");
            self.notifier.error(removal_message(removed));
        }
        self.persist();
        true
    }

    /// Run the mount-time reconciliation end to end.
    ///
    /// Returns whether an outcome was applied.
    pub async fn reconcile<L: ProductLookup>(&mut self, reconciler: &ProductReconciler<L>) -> bool {
        let Some(pending) = self.begin_reconciliation() else {
            return false;
        };
        let outcome = reconciler.check(pending).await;
        self.finish_reconciliation(outcome)
    }

    fn persist(&self) {
        if let Err(e) = self.cache.set(&self.key, &self.cart) {
            warn!(key = %self.key, error = %e, "failed to persist cart");
        }
    }
}

fn rehydrate<B: KvBackend>(cache: &Cache<B>, key: &str) -> Cart {
    match cache.get::<Cart>(key) {
        Ok(Some(cart)) => {
            debug!(key, lines = cart.unique_item_count(), "rehydrated cart");
            cart
        }
        Ok(None) => {
            debug!(key, "no persisted cart");
            Cart::new()
        }
        Err(CacheError::Corrupt { source, .. }) => {
            warn!(key, error = %source, "persisted cart is corrupt, starting empty");
            Cart::new()
        }
        Err(e) => {
            warn!(key, error = %e, "could not read persisted cart, starting empty");
            Cart::new()
        }
    }
}
