use uuid::Uuid;

use crate::{
    dto::auth::{
        AdminLoginResponse, CreateAdminRequest, ForgotPasswordRequest, LoginRequest,
        PrincipalKind, RefreshRequest, ResetPasswordRequest, ResetTokenIssued, TokenPair,
        TokenUse,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthAdmin,
    models::Admin,
    response::{ApiResponse, Meta},
    services::{
        auth_service::{
            consume_reset_token, hash_password, issue_reset_token, validate_credentials,
            verify_password,
        },
        token_service,
    },
    state::AppState,
};

const ADMIN_COLUMNS: &str = "id, name, email, created_at, updated_at";

pub async fn login_admin(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AdminLoginResponse>> {
    let email = payload.email.trim().to_lowercase();
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, password_hash FROM admins WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&state.pool)
            .await?;

    let (admin_id, password_hash) =
        row.ok_or_else(|| AppError::BadRequest("Invalid email or password".into()))?;
    if !verify_password(&payload.password, &password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let admin = find_admin(state, admin_id).await?;
    let tokens = token_service::issue_pair(&state.config, admin.id, PrincipalKind::Admin)?;

    tracing::info!(admin_id = %admin.id, "admin logged in");
    Ok(ApiResponse::success(
        "Logged in",
        AdminLoginResponse { admin, tokens },
        Some(Meta::empty()),
    ))
}

pub async fn refresh_token(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<TokenPair>> {
    let admin_id = token_service::verify(
        &state.config,
        &payload.refresh_token,
        PrincipalKind::Admin,
        TokenUse::Refresh,
    )?;
    find_admin(state, admin_id)
        .await
        .map_err(|_| AppError::Unauthorized("Account no longer exists".into()))?;

    let tokens = token_service::issue_pair(&state.config, admin_id, PrincipalKind::Admin)?;
    Ok(ApiResponse::success("Token refreshed", tokens, None))
}

pub async fn profile(state: &AppState, admin: &AuthAdmin) -> AppResult<ApiResponse<Admin>> {
    let admin = find_admin(state, admin.admin_id).await?;
    Ok(ApiResponse::success("Profile", admin, None))
}

pub async fn create_admin(
    state: &AppState,
    admin: &AuthAdmin,
    payload: CreateAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    let email = payload.email.trim().to_lowercase();
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    validate_credentials(&email, &payload.password)?;

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM admins WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".into()));
    }

    let created: Admin = sqlx::query_as(&format!(
        "INSERT INTO admins (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
         RETURNING {ADMIN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(payload.name.trim())
    .bind(email.as_str())
    .bind(hash_password(&payload.password)?)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(created_by = %admin.admin_id, admin_id = %created.id, "admin created");
    Ok(ApiResponse::success("Admin created", created, None))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<ResetTokenIssued>> {
    let issued = issue_reset_token(state, PrincipalKind::Admin, &payload.email).await?;
    Ok(ApiResponse::success("Reset token issued", issued, None))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<Admin>> {
    let admin_id = consume_reset_token(state, PrincipalKind::Admin, payload).await?;
    let admin = find_admin(state, admin_id).await?;
    Ok(ApiResponse::success("Password updated", admin, None))
}

async fn find_admin(state: &AppState, id: Uuid) -> AppResult<Admin> {
    let admin: Option<Admin> =
        sqlx::query_as(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    admin.ok_or(AppError::NotFound)
}
