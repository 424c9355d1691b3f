//! Plain-text liveness banners kept for frontend compatibility.

use axum::response::IntoResponse;

/// GET `/`
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = String),
    ),
    tag = "root"
)]
pub async fn root() -> impl IntoResponse {
    "NexGen WebCon server is running successfully"
}

/// GET `/api/auth`
#[utoipa::path(
    get,
    path = "/api/auth",
    responses(
        (status = 200, description = "Auth API banner", body = String),
    ),
    tag = "root"
)]
pub async fn auth_root() -> impl IntoResponse {
    "Auth API is running"
}
