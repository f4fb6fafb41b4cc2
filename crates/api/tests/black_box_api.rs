use std::sync::Arc;

use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use invadj_adjustments::{EntityLookup, SaveOptions};
use invadj_api::app::{build_app, services::AppServices};
use invadj_core::{AccountId, EntityCategory};
use invadj_infra::{InMemoryRecordStore, SeedCatalog};

const CATALOG: &str = r#"{
    "departments": ["Warehouse"],
    "subsidiaries": ["Main"],
    "locations": ["Dock-A"],
    "items": ["SKU-100"],
    "reasonCodes": [{ "name": "CYCLE_COUNT", "account": 600 }]
}"#;

struct TestServer {
    base_url: String,
    store: Arc<InMemoryRecordStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over a seeded in-memory store, on an ephemeral port.
        let store = Arc::new(InMemoryRecordStore::new());
        SeedCatalog::from_json(CATALOG)
            .unwrap()
            .apply(&*store)
            .await
            .expect("failed to seed store");

        let services = Arc::new(AppServices::in_memory(store.clone(), SaveOptions::relaxed()));
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }

    async fn id_of(&self, category: EntityCategory, name: &str) -> u64 {
        self.store
            .find_id_by_name(category, name)
            .await
            .unwrap()
            .expect("seeded entity")
            .get()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn scenario() -> Value {
    json!({
        "reasonCode": "CYCLE_COUNT",
        "department": "Warehouse",
        "subsidiary": "Main",
        "trandate": "2024-01-15",
        "item": "SKU-100",
        "location": "Dock-A",
        "adjustQtyBy": 12
    })
}

async fn submit(client: &reqwest::Client, base_url: &str, body: &Value) -> Value {
    let res = client
        .post(format!("{}/inventory-adjustments", base_url))
        .json(body)
        .send()
        .await
        .unwrap();
    // Failures are reported in the body, never through the status code.
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn cycle_count_scenario_creates_one_adjustment() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let result = submit(&client, &srv.base_url, &scenario()).await;
    assert_eq!(result["status"], "successful");
    let id = result["message"].as_u64().expect("numeric transaction id");

    let res = client
        .get(format!("{}/inventory-adjustments/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let adj: Value = res.json().await.unwrap();

    assert_eq!(adj["id"], id);
    assert_eq!(adj["trandate"], "2024-01-15");
    assert_eq!(adj["account"], 600);
    assert_eq!(adj["subsidiary"], srv.id_of(EntityCategory::Subsidiary, "Main").await);

    let lines = adj["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["item"], srv.id_of(EntityCategory::Item, "SKU-100").await);
    assert_eq!(lines[0]["location"], srv.id_of(EntityCategory::Location, "Dock-A").await);
    assert_eq!(
        lines[0]["department"],
        srv.id_of(EntityCategory::Department, "Warehouse").await
    );
    assert_eq!(lines[0]["adjustQtyBy"], 12);

    assert_eq!(srv.store.adjustments().len(), 1);
}

#[tokio::test]
async fn negative_quantity_is_stored_with_its_sign() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = scenario();
    body["adjustQtyBy"] = json!(-5);
    let result = submit(&client, &srv.base_url, &body).await;
    assert_eq!(result["status"], "successful");

    let saved = srv.store.adjustments();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].lines[0].adjust_qty_by, dec!(-5));
}

#[tokio::test]
async fn fractional_quantities_are_stored_as_sent() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for (sent, shown) in [(json!(2.5), json!(2.5)), (json!("-0.25"), json!(-0.25))] {
        let mut body = scenario();
        body["adjustQtyBy"] = sent;
        let result = submit(&client, &srv.base_url, &body).await;
        assert_eq!(result["status"], "successful");
        let id = result["message"].as_u64().unwrap();

        let adj: Value = client
            .get(format!("{}/inventory-adjustments/{}", srv.base_url, id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(adj["lines"][0]["adjustQtyBy"], shown);
    }

    let saved = srv.store.adjustments();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].lines[0].adjust_qty_by, dec!(2.5));
    assert_eq!(saved[1].lines[0].adjust_qty_by, dec!(-0.25));
}

#[tokio::test]
async fn unknown_names_fail_without_creating_anything() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cases = [
        ("reasonCode", "reason code not found: NOPE"),
        ("department", "department not found: NOPE"),
        ("subsidiary", "subsidiary not found: NOPE"),
        ("location", "location not found: NOPE"),
        ("item", "item not found: NOPE"),
    ];

    for (field, expected) in cases {
        let mut body = scenario();
        body[field] = json!("NOPE");
        let result = submit(&client, &srv.base_url, &body).await;
        assert_eq!(result, json!({ "status": "failed", "message": expected }));
    }

    assert!(srv.store.adjustments().is_empty());
}

#[tokio::test]
async fn duplicate_reason_codes_yield_a_single_adjustment() {
    let srv = TestServer::spawn().await;
    srv.store
        .insert_reason_code("CYCLE_COUNT", AccountId::new(700).unwrap())
        .unwrap();
    let client = reqwest::Client::new();

    let result = submit(&client, &srv.base_url, &scenario()).await;
    assert_eq!(result["status"], "successful");

    let saved = srv.store.adjustments();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].lines.len(), 1);
}

#[tokio::test]
async fn missing_fields_are_reported_by_name() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = scenario();
    body.as_object_mut().unwrap().remove("item");
    let result = submit(&client, &srv.base_url, &body).await;
    assert_eq!(
        result,
        json!({ "status": "failed", "message": "validation failed: item is required" })
    );
}
