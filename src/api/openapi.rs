use super::handlers::{auth, health, root};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "nexauth",
        description = "Credential management API for NexGen WebCon",
        license(name = "BSD-3-Clause"),
    ),
    paths(
        root::root,
        root::auth_root,
        health::health,
        auth::signup::send_otp,
        auth::signup::verify_otp,
        auth::login::login,
        auth::reset::forgot_password,
        auth::reset::reset_password,
        auth::session::check_auth,
        auth::session::logout,
    ),
    components(schemas(
        health::Health,
        auth::error::FieldError,
        auth::types::SendOtpRequest,
        auth::types::SendOtpResponse,
        auth::types::VerifyOtpRequest,
        auth::types::MessageResponse,
        auth::types::LoginRequest,
        auth::types::LoginResponse,
        auth::types::PublicUser,
        auth::types::ForgotPasswordRequest,
        auth::types::ResetPasswordRequest,
        auth::types::CheckAuthResponse,
    )),
    tags(
        (name = "auth", description = "Signup, login, password reset, and session checks"),
        (name = "health", description = "Service and database health"),
        (name = "root", description = "Liveness banners"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// GET `/openapi.json`
pub(crate) async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}
