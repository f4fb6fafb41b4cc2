use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use invadj_adjustments::{report_outcome, AdjustmentError, AdjustmentRequest};
use invadj_core::AdjustmentId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(submit_adjustment))
        .route("/:id", get(get_adjustment))
}

/// Create one inventory adjustment from a name-based request.
///
/// The raw body is parsed as JSON whatever its content type, so `text/plain`
/// clients work too. The response is always 200; callers read `status`.
pub async fn submit_adjustment(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let result = match serde_json::from_slice::<AdjustmentRequest>(&body) {
        Ok(request) => services.submit_adjustment(&request).await,
        Err(e) => report_outcome(Err(AdjustmentError::malformed_body(e))),
    };

    (StatusCode::OK, Json(result)).into_response()
}

pub async fn get_adjustment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AdjustmentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid adjustment id")
        }
    };

    match services.get_adjustment(id).await {
        Ok(Some(adj)) => (StatusCode::OK, Json(dto::adjustment_to_json(adj))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "adjustment not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use invadj_adjustments::SaveOptions;
    use invadj_core::EntityCategory;
    use invadj_infra::InMemoryRecordStore;

    use super::*;

    fn seeded_app() -> (Router, Arc<InMemoryRecordStore>) {
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_entity(EntityCategory::Department, "Warehouse").unwrap();
        store.insert_entity(EntityCategory::Subsidiary, "Main").unwrap();
        store.insert_entity(EntityCategory::Location, "Dock-A").unwrap();
        store.insert_entity(EntityCategory::Item, "SKU-100").unwrap();
        store
            .insert_reason_code("CYCLE_COUNT", invadj_core::AccountId::new(600).unwrap())
            .unwrap();

        let services = Arc::new(AppServices::in_memory(store.clone(), SaveOptions::relaxed()));
        (crate::app::build_app(services), store)
    }

    async fn post(app: Router, content_type: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let res = app
            .oneshot(
                Request::post("/inventory-adjustments")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
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

    #[tokio::test]
    async fn text_plain_body_is_parsed_as_json() {
        let (app, store) = seeded_app();
        let (status, body) = post(app, "text/plain", scenario().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "successful");
        assert!(body["message"].is_u64());
        assert_eq!(store.adjustments().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_a_failed_result_not_an_http_error() {
        let (app, store) = seeded_app();
        let (status, body) = post(app, "application/json", "{not json".to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "failed");
        assert!(body["message"].as_str().unwrap().starts_with("invalid request body"));
        assert!(store.adjustments().is_empty());
    }

    #[tokio::test]
    async fn non_utf8_body_is_a_failed_result_not_an_http_error() {
        let (app, store) = seeded_app();
        let mut bytes = br#"{"reasonCode":"CYCLE"#.to_vec();
        bytes.push(0xff);
        let (status, body) = post(app, "text/plain", bytes).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "failed");
        assert!(body["message"].as_str().unwrap().starts_with("invalid request body"));
        assert!(store.adjustments().is_empty());
    }

    #[tokio::test]
    async fn fractional_quantity_is_accepted() {
        let (app, store) = seeded_app();
        let mut req = scenario();
        req["adjustQtyBy"] = json!(2.5);
        let (status, body) = post(app, "application/json", req.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "successful");
        assert_eq!(store.adjustments()[0].lines[0].adjust_qty_by.to_string(), "2.5");
    }

    #[tokio::test]
    async fn get_with_malformed_id_is_bad_request() {
        let (app, _store) = seeded_app();
        let res = app
            .oneshot(Request::get("/inventory-adjustments/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (app, _store) = seeded_app();
        let res = app
            .oneshot(Request::get("/inventory-adjustments/777").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
