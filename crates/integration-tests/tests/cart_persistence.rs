//! Integration tests for mirroring the cart to the file store.

use storefront_cart::{
    CartManager, CartSettings, CartStore, CatalogConfig, FileStore, HttpCatalog, TracingNotifier,
};
use storefront_cart_core::{Cart, ProductId};
use storefront_cart_integration_tests::{StubCatalog, StubServer};

fn manager(server: &StubServer, store: FileStore) -> CartManager<HttpCatalog, FileStore> {
    let catalog = HttpCatalog::new(&CatalogConfig::new(server.base_url())).expect("http client");
    CartManager::initialize(catalog, store, TracingNotifier, CartSettings::default())
}

fn quantities(cart: &Cart) -> Vec<(i32, u32)> {
    cart.iter()
        .map(|item| (item.product_id.as_i32(), item.quantity))
        .collect()
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = StubCatalog::new()
        .with_product(1, "Tênis de Caminhada", 179.9, 5)
        .with_product(2, "Tênis Couro", 139.9, 5)
        .serve()
        .await
        .expect("start stub server");

    let first = manager(&server, FileStore::new(dir.path()));
    first.add_product(ProductId::new(2)).await.expect("add 2");
    first.add_product(ProductId::new(1)).await.expect("add 1");
    first
        .update_product_amount(ProductId::new(2), 4)
        .await
        .expect("update 2");
    let before = first.cart();
    drop(first);

    let second = manager(&server, FileStore::new(dir.path()));
    assert_eq!(second.cart(), before);
    assert_eq!(quantities(&second.cart()), vec![(2, 4), (1, 1)]);

    let third = manager(&server, FileStore::new(dir.path()));
    assert_eq!(third.cart(), second.cart());
}

#[tokio::test]
async fn test_stored_schema_is_canonical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = StubCatalog::new()
        .with_product(42, "Tênis Adidas", 219.9, 5)
        .serve()
        .await
        .expect("start stub server");
    let store = FileStore::new(dir.path());

    let cart = manager(&server, store.clone());
    cart.add_product(ProductId::new(42)).await.expect("add");

    let raw = store
        .read("@RocketShoes:cart")
        .expect("read")
        .expect("cart stored");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(
        value,
        serde_json::json!([{
            "productId": 42,
            "title": "Tênis Adidas",
            "price": "219.9",
            "imageUrl": "https://cdn.example.com/products/42.jpg",
            "quantity": 1
        }])
    );
    assert!(dir.path().join("_40RocketShoes_3Acart.json").exists());
}

#[tokio::test]
async fn test_corrupt_file_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = StubCatalog::new()
        .with_product(7, "Chinelo", 29.9, 2)
        .serve()
        .await
        .expect("start stub server");
    let store = FileStore::new(dir.path());
    store
        .write("@RocketShoes:cart", "[{\"id\": 7, \"amount\": 1}]")
        .expect("write legacy value");

    let cart = manager(&server, store.clone());
    assert!(cart.cart().is_empty());

    let change = cart.add_product(ProductId::new(7)).await.expect("add");
    assert!(change.persisted);

    let reloaded = manager(&server, store);
    assert_eq!(quantities(&reloaded.cart()), vec![(7, 1)]);
}

#[tokio::test]
async fn test_unwritable_store_degrades_silently() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").expect("create blocker file");
    let server = StubCatalog::new()
        .with_product(7, "Chinelo", 29.9, 2)
        .serve()
        .await
        .expect("start stub server");

    let cart = manager(&server, FileStore::new(&blocker));
    let change = cart.add_product(ProductId::new(7)).await.expect("add");

    assert!(!change.persisted);
    assert_eq!(quantities(&cart.cart()), vec![(7, 1)]);
}
