use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::db_helpers::get_user_by_id;
use crate::errors::RequestError;
use crate::models::Role;

const DEFAULT_JWT_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    exp: i64,
}

/// Identity attached to a request once the bearer token has been verified
/// and resolved against a live user row. Also usable directly as an
/// extractor for endpoints that require authentication.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

/// Optional-auth extractor: anonymous when no Authorization header is
/// present; a header that is present but invalid is still rejected.
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn get(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }

    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = match parts.headers.get("Authorization") {
            Some(header) => header,
            None => return Ok(MaybeUser(None)),
        };
        let header = header
            .to_str()
            .map_err(|_| RequestError::NotAuthorized("Invalid token"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(RequestError::NotAuthorized("Invalid token"))?;
        let id = verify_jwt_token(token)?;

        // A token is only as good as the account behind it.
        let pool = parts
            .extensions
            .get::<Arc<SqlitePool>>()
            .cloned()
            .ok_or(RequestError::ServerError("database not attached"))?;
        let user = get_user_by_id(&pool, id)
            .await?
            .ok_or(RequestError::NotAuthorized("User no longer exists"))?;

        Ok(MaybeUser(Some(AuthUser {
            id: user.id,
            role: user.role,
        })))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.ok_or(RequestError::NotAuthorized("Authentication required"))
    }
}

pub fn get_jwt_token(id: i64) -> Result<String> {
    let jwt_secret = std::env::var("JWT_SECRET").context("Failed to get JWT_SECRET")?;
    let expiry_days = std::env::var("JWT_EXPIRES_IN_DAYS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_JWT_EXPIRY_DAYS);
    let expiry_date = OffsetDateTime::now_utc() + time::Duration::days(expiry_days);
    let claim = AuthClaim {
        id,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(token: &str) -> std::result::Result<i64, RequestError> {
    let jwt_secret =
        std::env::var("JWT_SECRET").map_err(|_| RequestError::ServerError("JWT_SECRET not set"))?;
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|_| RequestError::NotAuthorized("Invalid token"))?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok(claim.id)
}

pub async fn verify_password_argon2(password: String, hash: &str) -> Result<bool> {
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to verify password"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}
