use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::{
    get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser,
};
use crate::data_formats::{
    AuthResponse, LoginRequest, ProfileEnvelope, RegisterRequest, UpdateProfileRequest,
    UserResponse, UserWrapper,
};
use crate::db_helpers::{
    find_user_by_email_or_username, get_user_by_email, get_user_with_counts, insert_user,
    update_profile_in_db,
};
use crate::errors::RequestError;

use super::{CreatedResult, JsonResult};

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<RegisterRequest>,
) -> CreatedResult<AuthResponse> {
    request.validate()?;

    if let Some(existing) =
        find_user_by_email_or_username(&pool, &request.email, &request.username).await?
    {
        let field = if existing.email == request.email {
            "email"
        } else {
            "username"
        };
        return Err(RequestError::DuplicateUser { field });
    }

    let password_hash = hash_password_argon2(request.password.clone())
        .await
        .map_err(|_| RequestError::ServerError("Could not hash password"))?;
    let user = insert_user(&pool, &request, &password_hash).await?;

    let token = get_jwt_token(user.id)
        .map_err(|_| RequestError::ServerError("Could not generate token"))?;
    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            user: UserResponse::new(user, true),
            token,
        }),
    ))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> JsonResult<AuthResponse> {
    request.validate()?;

    // The same response for an unknown email and a wrong password.
    let user = get_user_by_email(&pool, &request.email)
        .await?
        .ok_or(RequestError::NotAuthorized("Invalid email or password"))?;
    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| RequestError::ServerError("Could not verify password"))?;
    if !is_password_correct {
        return Err(RequestError::NotAuthorized("Invalid email or password"));
    }

    let token = get_jwt_token(user.id)
        .map_err(|_| RequestError::ServerError("Could not generate token"))?;

    Ok(Json(AuthResponse {
        message: "Login successful",
        user: UserResponse::new(user, true),
        token,
    }))
}

pub async fn get_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
) -> JsonResult<UserWrapper> {
    let user = get_user_with_counts(&pool, auth.id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    Ok(Json(UserWrapper {
        user: UserResponse::with_counts(user, true),
    }))
}

pub async fn update_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> JsonResult<ProfileEnvelope> {
    request.validate()?;
    let user = update_profile_in_db(&pool, auth.id, request).await?;
    Ok(Json(ProfileEnvelope {
        message: "Profile updated successfully",
        user: UserResponse::new(user, true),
    }))
}
