//! Client-side cart for the shopfront.
//!
//! - **Store**: [`CartStore`] holds the cart, persists it, rehydrates it
//! - **Reconciliation**: drops products the catalog no longer carries
//! - **Checkout**: re-checks the cart against live stock before ordering
//! - **Notifications**: shopper-facing messages, fire-and-forget
//!
//! # Example
//!
//! ```rust
//! use shop_cache::Cache;
//! use shop_client::prelude::*;
//! use shop_commerce::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let lamp = Product::new("p1", "Desk Lamp", Money::new(2599, Currency::USD), 3);
//! let catalog = InMemoryCatalog::with_products([lamp.clone()]);
//!
//! let notifier = RecordingNotifier::new();
//! let mut store = CartStore::mount(Cache::in_memory(), notifier.clone());
//! store.reconcile(&ProductReconciler::new(catalog)).await;
//!
//! store.add_to_cart(lamp, 2).unwrap();
//! assert_eq!(store.total_items(), 2);
//! assert_eq!(notifier.notifications()[0].message, "Added Desk Lamp to cart");
//! # }
//! ```

pub mod checkout;
pub mod config;
pub mod lookup;
pub mod notify;
pub mod reconcile;
pub mod store;
pub mod telemetry;

pub use checkout::{add_product_by_id, revalidate_for_checkout, AddError, CheckoutIssue, CheckoutReview};
pub use config::{ClientConfig, ConfigError, LogFormat};
pub use lookup::{ApiProductLookup, InMemoryCatalog, LookupError, ProductLookup};
pub use notify::{
    ChannelNotifier, Notification, Notifier, RecordingNotifier, Severity, TracingNotifier,
};
pub use reconcile::{
    removal_message, PendingReconciliation, ProductReconciler, Reconciled, ReconciliationOutcome,
};
pub use store::{CartStore, MountToken, DEFAULT_STORAGE_KEY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::checkout::{add_product_by_id, revalidate_for_checkout, CheckoutReview};
    pub use crate::lookup::{ApiProductLookup, InMemoryCatalog, ProductLookup};
    pub use crate::notify::{
        ChannelNotifier, Notification, Notifier, RecordingNotifier, Severity, TracingNotifier,
    };
    pub use crate::reconcile::ProductReconciler;
    pub use crate::store::CartStore;
}
