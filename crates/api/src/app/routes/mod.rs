use axum::Router;

pub mod adjustments;
pub mod system;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new().nest("/inventory-adjustments", adjustments::router())
}
