//! End-to-end behaviour of the cart store: stock gates, totals, persistence
//! and mount-time reconciliation.

use std::sync::Arc;

use serde_json::json;
use shop_cache::{Cache, FileBackend, KvBackend, MemoryBackend};
use shop_client::prelude::*;
use shop_client::DEFAULT_STORAGE_KEY;
use shop_commerce::prelude::*;

fn product(id: &str, cents: i64, stock: i64) -> Product {
    Product::new(id, format!("Product {id}"), Money::new(cents, Currency::USD), stock)
}

fn mount(backend: &MemoryBackend) -> (CartStore<MemoryBackend, RecordingNotifier>, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let store = CartStore::mount(Cache::new(backend.clone()), notifier.clone());
    (store, notifier)
}

fn assert_totals_consistent<B: KvBackend, N: Notifier>(store: &CartStore<B, N>) {
    let items = store.items();
    let quantity: i64 = items.iter().map(|i| i.quantity).sum();
    let price: i64 = items
        .iter()
        .map(|i| i.product.price.amount_cents * i.quantity)
        .sum();

    assert_eq!(store.total_items(), quantity);
    assert_eq!(store.total_price().amount_cents, price);
    assert!(items.iter().all(|i| i.quantity >= 1));

    let mut ids: Vec<_> = items.iter().map(|i| i.product.id.clone()).collect();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    assert_eq!(ids.len(), items.len(), "duplicate product lines");
}

#[test]
fn totals_stay_consistent_across_operations() {
    let backend = MemoryBackend::new();
    let (mut store, _) = mount(&backend);
    let a = product("a", 1250, 10);
    let b = product("b", 399, 4);

    store.add_to_cart(a.clone(), 2).unwrap();
    assert_totals_consistent(&store);
    store.add_to_cart(b.clone(), 3).unwrap();
    assert_totals_consistent(&store);
    store.add_to_cart(a.clone(), 1).unwrap();
    assert_totals_consistent(&store);
    let _ = store.add_to_cart(b.clone(), 5);
    assert_totals_consistent(&store);
    store.update_quantity(&a.id, 7).unwrap();
    assert_totals_consistent(&store);
    store.remove_from_cart(&b.id);
    assert_totals_consistent(&store);
    store.update_quantity(&a.id, 0).unwrap();
    assert_totals_consistent(&store);
    store.clear_cart();
    assert_totals_consistent(&store);

    assert_eq!(store.total_items(), 0);
    assert!(store.total_price().is_zero());
}

#[test]
fn adding_same_product_twice_keeps_one_line() {
    let (mut store, _) = mount(&MemoryBackend::new());
    store.add_one(product("a", 100, 5)).unwrap();
    store.add_to_cart(product("a", 100, 5), 2).unwrap();

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0].quantity, 3);
}

#[test]
fn non_positive_add_is_rejected() {
    let (mut store, notifier) = mount(&MemoryBackend::new());

    assert!(store.add_to_cart(product("a", 100, 5), 0).is_err());
    assert!(store.add_to_cart(product("a", 100, 5), -2).is_err());
    assert!(store.items().is_empty());
    assert_eq!(
        notifier.errors(),
        vec![
            "Quantity must be greater than 0".to_string(),
            "Quantity must be greater than 0".to_string()
        ]
    );
}

#[test]
fn removing_absent_product_changes_nothing() {
    let (mut store, notifier) = mount(&MemoryBackend::new());
    store.add_to_cart(product("a", 100, 5), 2).unwrap();
    let before = store.cart().clone();
    notifier.drain();

    assert!(!store.remove_from_cart(&ProductId::from("nope")));
    assert_eq!(*store.cart(), before);
    assert!(notifier.notifications().is_empty());
}

#[test]
fn stock_gate_counts_what_is_already_in_the_cart() {
    let (mut store, notifier) = mount(&MemoryBackend::new());
    let p = product("p", 500, 5);

    let err = store.add_to_cart(p.clone(), 6).unwrap_err();
    assert_eq!(err.to_string(), "Only 5 of Product p available in stock");
    assert!(store.items().is_empty());

    store.add_to_cart(p.clone(), 5).unwrap();
    assert_eq!(store.total_items(), 5);

    let err = store.add_to_cart(p, 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Only 0 more of Product p available. You already have 5 in your cart"
    );
    assert_eq!(store.total_items(), 5);
    assert_eq!(notifier.errors().len(), 2);
}

#[test]
fn out_of_stock_product_cannot_be_added() {
    let (mut store, notifier) = mount(&MemoryBackend::new());
    assert!(store.add_to_cart(product("q", 500, 0), 1).is_err());
    assert!(store.items().is_empty());
    assert_eq!(notifier.errors(), vec!["Product q is out of stock".to_string()]);
}

#[test]
fn update_replaces_rather_than_adds() {
    let (mut store, _) = mount(&MemoryBackend::new());
    let p = product("p", 500, 5);
    store.add_to_cart(p.clone(), 3).unwrap();

    store.update_quantity(&p.id, 5).unwrap();
    assert_eq!(store.cart().quantity_of(&p.id), 5);

    store.update_quantity(&p.id, 3).unwrap();
    assert!(store.update_quantity(&p.id, 6).is_err());
    assert_eq!(store.cart().quantity_of(&p.id), 3);
}

#[test]
fn update_to_zero_or_negative_removes_line() {
    for quantity in [0, -1] {
        let (mut store, notifier) = mount(&MemoryBackend::new());
        let p = product("p", 500, 5);
        store.add_to_cart(p.clone(), 2).unwrap();
        notifier.drain();

        store.update_quantity(&p.id, quantity).unwrap();
        assert!(store.items().is_empty());
        assert!(notifier.errors().is_empty());
    }
}

#[tokio::test]
async fn reconciliation_drops_missing_products_once() {
    let backend = MemoryBackend::new();
    let (a, b, c) = (product("a", 100, 5), product("b", 200, 5), product("c", 300, 5));
    {
        let (mut store, _) = mount(&backend);
        store.add_to_cart(a.clone(), 1).unwrap();
        store.add_to_cart(b.clone(), 2).unwrap();
        store.add_to_cart(c.clone(), 3).unwrap();
    }

    let catalog = Arc::new(InMemoryCatalog::with_products([a.clone(), c.clone()]));
    let reconciler = ProductReconciler::new(catalog);

    let (mut store, notifier) = mount(&backend);
    assert!(store.reconcile(&reconciler).await);

    let ids: Vec<_> = store.items().iter().map(|i| i.product.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(store.total_items(), 4);
    assert_eq!(
        notifier.errors(),
        vec!["1 product was removed from your cart because it is no longer available".to_string()]
    );

    // Second pass on the same mount does nothing.
    assert!(!store.reconcile(&reconciler).await);
    assert_eq!(notifier.errors().len(), 1);

    // The pruned cart was persisted.
    let (remounted, _) = mount(&backend);
    assert_eq!(remounted.items().len(), 2);
}

#[tokio::test]
async fn reconciliation_with_everything_present_is_silent() {
    let backend = MemoryBackend::new();
    let a = product("a", 100, 5);
    mount(&backend).0.add_to_cart(a.clone(), 1).unwrap();

    let (mut store, notifier) = mount(&backend);
    store
        .reconcile(&ProductReconciler::new(InMemoryCatalog::with_products([a])))
        .await;

    assert_eq!(store.items().len(), 1);
    assert!(notifier.notifications().is_empty());
}

#[tokio::test]
async fn failed_lookups_are_treated_as_missing() {
    let backend = MemoryBackend::new();
    let (a, b) = (product("a", 100, 5), product("b", 200, 5));
    {
        let (mut store, _) = mount(&backend);
        store.add_to_cart(a.clone(), 1).unwrap();
        store.add_to_cart(b.clone(), 1).unwrap();
    }
    let catalog = InMemoryCatalog::with_products([a.clone(), b.clone()]);
    catalog.fail("a");
    catalog.fail("b");

    let (mut store, notifier) = mount(&backend);
    store.reconcile(&ProductReconciler::new(catalog)).await;

    assert!(store.items().is_empty());
    assert_eq!(
        notifier.errors(),
        vec!["2 products were removed from your cart because they are no longer available".to_string()]
    );
}

#[tokio::test]
async fn reconciliation_after_unmount_is_discarded() {
    let backend = MemoryBackend::new();
    mount(&backend).0.add_to_cart(product("a", 100, 5), 1).unwrap();

    let (mut store, notifier) = mount(&backend);
    let pending = store.begin_reconciliation().unwrap();
    let outcome = ProductReconciler::new(InMemoryCatalog::new()).check(pending).await;

    store.unmount();
    assert!(!store.finish_reconciliation(outcome));
    assert_eq!(store.items().len(), 1);
    assert!(notifier.notifications().is_empty());
}

#[test]
fn persistence_round_trips_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let p = product("p", 1999, 9);
    let q = product("q", 5, 9);

    let saved = {
        let cache = Cache::new(FileBackend::open(dir.path()).unwrap());
        let mut store = CartStore::mount(cache, TracingNotifier);
        store.add_to_cart(p, 2).unwrap();
        store.add_to_cart(q, 7).unwrap();
        store.cart().clone()
    };

    let cache = Cache::new(FileBackend::open(dir.path()).unwrap());
    let store = CartStore::mount(cache, TracingNotifier);
    assert_eq!(*store.cart(), saved);
    assert_eq!(store.total_items(), 9);
    assert_eq!(store.total_price(), Money::new(3998 + 35, Currency::USD));
}

#[test]
fn persisted_shape_is_items_and_totals() {
    let backend = MemoryBackend::new();
    mount(&backend).0.add_to_cart(product("p", 250, 9), 2).unwrap();

    let raw = backend.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(value["totalItems"], 2);
    assert_eq!(value["items"][0]["quantity"], 2);
    assert_eq!(value["items"][0]["product"]["id"], "p");
    assert!(value.get("totalPrice").is_some());
}

#[test]
fn corrupt_storage_starts_empty_without_notifying() {
    let backend = MemoryBackend::new();
    backend.set(DEFAULT_STORAGE_KEY, b"{ not json").unwrap();

    let (mut store, notifier) = mount(&backend);
    assert!(store.items().is_empty());
    assert_eq!(store.total_items(), 0);
    assert!(notifier.notifications().is_empty());

    // The store is usable and overwrites the bad value.
    store.add_one(product("a", 100, 1)).unwrap();
    let (remounted, _) = mount(&backend);
    assert_eq!(remounted.total_items(), 1);
}

#[test]
fn stored_totals_are_recomputed_and_bad_lines_dropped() {
    let backend = MemoryBackend::new();
    let a = serde_json::to_value(product("a", 100, 9)).unwrap();
    let b = serde_json::to_value(product("b", 300, 9)).unwrap();
    let stored = json!({
        "items": [
            {"product": a, "quantity": 2},
            {"product": b, "quantity": 0},
            {"product": a, "quantity": 1}
        ],
        "totalItems": 999,
        "totalPrice": {"amount_cents": 1, "currency": "USD"}
    });
    backend
        .set(DEFAULT_STORAGE_KEY, &serde_json::to_vec(&stored).unwrap())
        .unwrap();

    let (store, _) = mount(&backend);
    assert_eq!(store.items().len(), 1);
    assert_eq!(store.total_items(), 3);
    assert_eq!(store.total_price(), Money::new(300, Currency::USD));
}

#[tokio::test]
async fn channel_notifier_receives_store_messages() {
    let (notifier, mut rx) = ChannelNotifier::new();
    let mut store = CartStore::mount(Cache::in_memory(), notifier);

    store.add_one(product("a", 100, 1)).unwrap();
    let _ = store.add_one(product("a", 100, 1));

    let first = rx.recv().await.unwrap();
    assert_eq!(first.severity, Severity::Success);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.severity, Severity::Error);
}
