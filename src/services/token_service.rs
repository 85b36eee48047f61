use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::auth::{Claims, PrincipalKind, TokenPair, TokenUse},
    error::{AppError, AppResult},
};

/// Issue an access/refresh pair for a customer or an admin.
pub fn issue_pair(config: &AppConfig, subject: Uuid, kind: PrincipalKind) -> AppResult<TokenPair> {
    let access_ttl = Duration::minutes(config.access_token_ttl_minutes);
    let refresh_ttl = Duration::days(config.refresh_token_ttl_days);

    let access_token = sign(&config.jwt_secret, subject, kind, TokenUse::Access, access_ttl)?;
    let refresh_token = sign(
        &config.jwt_refresh_secret,
        subject,
        kind,
        TokenUse::Refresh,
        refresh_ttl,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer".into(),
        expires_in: access_ttl.num_seconds(),
    })
}

fn sign(
    secret: &str,
    subject: Uuid,
    kind: PrincipalKind,
    token_use: TokenUse,
    ttl: Duration,
) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: subject.to_string(),
        kind,
        token_use,
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Decode a token and check that it was issued for `kind` and `token_use`.
pub fn verify(
    config: &AppConfig,
    token: &str,
    kind: PrincipalKind,
    token_use: TokenUse,
) -> AppResult<Uuid> {
    let secret = match token_use {
        TokenUse::Access => &config.jwt_secret,
        TokenUse::Refresh => &config.jwt_refresh_secret,
    };

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    if decoded.claims.token_use != token_use {
        return Err(AppError::Unauthorized("Wrong token type".into()));
    }
    // Signed correctly but issued for the other principal table.
    if decoded.claims.kind != kind {
        return Err(AppError::Forbidden);
    }

    Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid subject in token".into()))
}
