use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    dto::auth::{
        CustomerLoginResponse, ForgotPasswordRequest, LoginRequest, PrincipalKind, RefreshRequest,
        RegisterRequest, ResetPasswordRequest, ResetTokenIssued, TokenPair, TokenUse,
        UpdateProfileRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Customer,
    response::{ApiResponse, Meta},
    services::token_service,
    state::AppState,
};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, created_at, updated_at";
const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub(crate) fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub(crate) fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn principal_table(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::Customer => "users",
        PrincipalKind::Admin => "admins",
    }
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Customer>> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
        address,
    } = payload;
    let email = email.trim().to_lowercase();
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    validate_credentials(&email, &password)?;

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user: Customer = sqlx::query_as(&format!(
        "INSERT INTO users (id, name, email, password_hash, phone, address) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(phone)
    .bind(address)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(user_id = %user.id, "customer registered");
    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<CustomerLoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&state.pool)
            .await?;

    let (user_id, password_hash) = match row {
        Some(r) => r,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    if !verify_password(&password, &password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let user = find_customer(state, user_id).await?;
    let tokens = token_service::issue_pair(&state.config, user.id, PrincipalKind::Customer)?;

    Ok(ApiResponse::success(
        "Logged in",
        CustomerLoginResponse { user, tokens },
        Some(Meta::empty()),
    ))
}

pub async fn refresh_token(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<TokenPair>> {
    let user_id = token_service::verify(
        &state.config,
        &payload.refresh_token,
        PrincipalKind::Customer,
        TokenUse::Refresh,
    )?;
    // Rejects tokens of deleted accounts.
    find_customer(state, user_id)
        .await
        .map_err(|_| AppError::Unauthorized("Account no longer exists".into()))?;

    let tokens = token_service::issue_pair(&state.config, user_id, PrincipalKind::Customer)?;
    Ok(ApiResponse::success("Token refreshed", tokens, None))
}

pub async fn profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Customer>> {
    let customer = find_customer(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile", customer, None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Customer>> {
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Name must not be empty".into()));
    }
    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validate_credentials(&user.email, password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let customer: Customer = sqlx::query_as(&format!(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            address = COALESCE($4, address),
            password_hash = COALESCE($5, password_hash),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(user.user_id)
    .bind(payload.name.map(|n| n.trim().to_string()))
    .bind(payload.phone)
    .bind(payload.address)
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Profile updated", customer, None))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<ResetTokenIssued>> {
    let issued = issue_reset_token(state, PrincipalKind::Customer, &payload.email).await?;
    Ok(ApiResponse::success("Reset token issued", issued, None))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<Customer>> {
    let user_id = consume_reset_token(state, PrincipalKind::Customer, payload).await?;
    let customer = find_customer(state, user_id).await?;
    Ok(ApiResponse::success("Password updated", customer, None))
}

/// Store a fresh single-use reset token with an expiry on the account row.
pub(crate) async fn issue_reset_token(
    state: &AppState,
    kind: PrincipalKind,
    email: &str,
) -> AppResult<ResetTokenIssued> {
    let table = principal_table(kind);
    let token = Uuid::new_v4().simple().to_string();
    let expires_at = Utc::now() + Duration::minutes(state.config.reset_token_ttl_minutes);

    let updated: Option<(Uuid,)> = sqlx::query_as(&format!(
        "UPDATE {table} SET reset_token = $2, reset_token_expires_at = $3, updated_at = NOW() \
         WHERE email = $1 RETURNING id"
    ))
    .bind(email.trim().to_lowercase())
    .bind(token.as_str())
    .bind(expires_at)
    .fetch_optional(&state.pool)
    .await?;

    let (id,) = updated.ok_or(AppError::NotFound)?;
    tracing::debug!(account_id = %id, table, "password reset token issued");

    Ok(ResetTokenIssued {
        reset_token: token,
        expires_at,
    })
}

pub(crate) async fn consume_reset_token(
    state: &AppState,
    kind: PrincipalKind,
    payload: ResetPasswordRequest,
) -> AppResult<Uuid> {
    let table = principal_table(kind);
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let row: Option<(Uuid, Option<DateTime<Utc>>)> = sqlx::query_as(&format!(
        "SELECT id, reset_token_expires_at FROM {table} WHERE reset_token = $1"
    ))
    .bind(payload.token.trim())
    .fetch_optional(&state.pool)
    .await?;

    let (id, expires_at) =
        row.ok_or_else(|| AppError::BadRequest("Invalid reset token".into()))?;
    if expires_at.is_none_or(|at| at < Utc::now()) {
        return Err(AppError::BadRequest("Reset token has expired".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    sqlx::query(&format!(
        "UPDATE {table} SET password_hash = $2, reset_token = NULL, \
         reset_token_expires_at = NULL, updated_at = NOW() WHERE id = $1"
    ))
    .bind(id)
    .bind(password_hash)
    .execute(&state.pool)
    .await?;

    Ok(id)
}

async fn find_customer(state: &AppState, id: Uuid) -> AppResult<Customer> {
    let customer: Option<Customer> =
        sqlx::query_as(&format!("SELECT {CUSTOMER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    customer.ok_or(AppError::NotFound)
}
