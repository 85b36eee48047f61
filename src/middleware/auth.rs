use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    dto::auth::{PrincipalKind, TokenUse},
    error::AppError,
    models::{Admin, Customer},
    services::token_service,
    state::AppState,
};

/// Authenticated customer, loaded from `users`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

/// Authenticated back-office operator, loaded from `admins`.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub admin_id: Uuid,
    pub email: String,
    pub name: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token".into()));
    }
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id = token_service::verify(
            &state.config,
            token,
            PrincipalKind::Customer,
            TokenUse::Access,
        )?;

        let user: Option<Customer> = sqlx::query_as(
            "SELECT id, name, email, phone, address, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;

        let user = user.ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
        })
    }
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let admin_id = token_service::verify(
            &state.config,
            token,
            PrincipalKind::Admin,
            TokenUse::Access,
        )?;

        let admin: Option<Admin> = sqlx::query_as(
            "SELECT id, name, email, created_at, updated_at FROM admins WHERE id = $1",
        )
        .bind(admin_id)
        .fetch_optional(&state.pool)
        .await?;

        let admin = admin.ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

        Ok(AuthAdmin {
            admin_id: admin.id,
            email: admin.email,
            name: admin.name,
        })
    }
}
