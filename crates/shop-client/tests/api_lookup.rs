//! `ApiProductLookup` against a local storefront API.

use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use shop_cache::Cache;
use shop_client::prelude::*;
use shop_client::LookupError;
use shop_commerce::prelude::*;
use shop_data::FetchClient;

async fn product(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "lamp" => Json(json!({
            "_id": "lamp",
            "name": "Desk Lamp",
            "price": 25.99,
            "countInStock": 4,
            "category": {"_id": "lighting", "name": "Lighting"}
        }))
        .into_response(),
        "mug" => Json(json!({"id": "mug", "name": "Mug", "price": 8.5, "stock": 0})).into_response(),
        "broken" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "database offline"})),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "Product not found"}))).into_response(),
    }
}

async fn serve() -> String {
    let app = Router::new().route("/api/products/{id}", get(product));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn lookup(base_url: String) -> ApiProductLookup {
    ApiProductLookup::new(
        FetchClient::new()
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5)),
    )
}

#[tokio::test]
async fn finds_existing_product() {
    let lookup = lookup(serve().await);
    let found = lookup.find_product(&"lamp".into()).await.unwrap().unwrap();

    assert_eq!(found.name, "Desk Lamp");
    assert_eq!(found.price, Money::new(2599, Currency::USD));
    assert_eq!(found.stock, 4);
    assert_eq!(found.category.label(), "Lighting");
}

#[tokio::test]
async fn not_found_is_none() {
    let lookup = lookup(serve().await);
    assert!(lookup.find_product(&"gone".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_id_never_reaches_the_server() {
    let lookup = lookup(serve().await);
    assert!(lookup
        .find_product(&"../admin".into())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn server_error_is_an_error() {
    let lookup = lookup(serve().await);
    let err = lookup.find_product(&"broken".into()).await.unwrap_err();
    assert!(matches!(err, LookupError::Fetch(_)));
    assert!(err.to_string().contains("database offline"));
}

#[tokio::test]
async fn reconcile_against_api() {
    let lookup = lookup(serve().await);
    let notifier = RecordingNotifier::new();
    let backend = shop_cache::MemoryBackend::new();

    {
        let mut store = CartStore::mount(Cache::new(backend.clone()), RecordingNotifier::new());
        store
            .add_to_cart(Product::new("lamp", "Desk Lamp", Money::new(2599, Currency::USD), 4), 1)
            .unwrap();
        store
            .add_to_cart(Product::new("gone", "Old Stock", Money::new(100, Currency::USD), 9), 2)
            .unwrap();
        store
            .add_to_cart(Product::new("broken", "Flaky", Money::new(100, Currency::USD), 9), 1)
            .unwrap();
    }

    let mut store = CartStore::mount(Cache::new(backend), notifier.clone());
    store.reconcile(&ProductReconciler::new(lookup)).await;

    let ids: Vec<_> = store.items().iter().map(|i| i.product.id.as_str()).collect();
    assert_eq!(ids, vec!["lamp"]);
    assert_eq!(
        notifier.errors(),
        vec!["2 products were removed from your cart because they are no longer available".to_string()]
    );
}

#[tokio::test]
async fn add_by_id_and_checkout_use_live_stock() {
    let lookup = lookup(serve().await);
    let notifier = RecordingNotifier::new();
    let mut store = CartStore::mount(Cache::in_memory(), notifier.clone());

    add_product_by_id(&mut store, &lookup, &"lamp".into(), 3).await.unwrap();
    assert!(add_product_by_id(&mut store, &lookup, &"mug".into(), 1).await.is_err());
    assert_eq!(notifier.errors(), vec!["Mug is out of stock".to_string()]);

    let review = revalidate_for_checkout(&mut store, &lookup).await;
    assert!(review.is_ready());
}
