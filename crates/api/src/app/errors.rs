use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use invadj_adjustments::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        StoreError::Rejected(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "rejected", msg),
        e @ StoreError::InvalidReference { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_reference", e.to_string())
        }
        StoreError::Domain(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
