use axum::response::IntoResponse;
use hyper::StatusCode;
use tracing::instrument;

#[instrument(name = "Health Check", ret)]
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
