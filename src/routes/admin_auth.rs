use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::auth::{
        AdminLoginResponse, CreateAdminRequest, ForgotPasswordRequest, LoginRequest,
        RefreshRequest, ResetPasswordRequest, ResetTokenIssued, TokenPair,
    },
    error::AppResult,
    middleware::auth::AuthAdmin,
    models::Admin,
    response::ApiResponse,
    services::admin_auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .route("/admins", post(create_admin))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login admin", body = ApiResponse<AdminLoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Admin Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AdminLoginResponse>>> {
    let resp = admin_auth_service::login_admin(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid refresh token")
    ),
    tag = "Admin Auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let resp = admin_auth_service::refresh_token(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/auth/me",
    responses(
        (status = 200, description = "Current admin", body = ApiResponse<Admin>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an admin token")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    admin: AuthAdmin,
) -> AppResult<Json<ApiResponse<Admin>>> {
    let resp = admin_auth_service::profile(&state, &admin).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/admins",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<Admin>),
        (status = 400, description = "Invalid payload or email already taken"),
        (status = 403, description = "Not an admin token")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Auth"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Json(payload): Json<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Admin>>)> {
    let resp = admin_auth_service::create_admin(&state, &admin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset token issued", body = ApiResponse<ResetTokenIssued>),
        (status = 404, description = "Unknown email")
    ),
    tag = "Admin Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<ResetTokenIssued>>> {
    let resp = admin_auth_service::forgot_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<Admin>),
        (status = 400, description = "Invalid or expired token")
    ),
    tag = "Admin Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<Admin>>> {
    let resp = admin_auth_service::reset_password(&state, payload).await?;
    Ok(Json(resp))
}
