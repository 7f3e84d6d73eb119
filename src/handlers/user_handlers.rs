use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::authentication::{AuthUser, MaybeUser};
use crate::data_formats::{
    ArticleResponse, ArticlesPage, DeletedUserResponse, PageQuery, PaginationMeta,
    UserListQuery, UserResponse, UserWrapper, UsersPage,
};
use crate::db_helpers::{
    delete_user_in_db, get_user_by_id, get_user_with_counts, list_articles_in_db,
    list_users_in_db, tags_for_articles, ArticleFilter,
};
use crate::errors::RequestError;
use crate::helpers::paginate;
use crate::models::Role;
use crate::policy::{user_allows, UserAction};

use super::article_handlers::tags_by_article;
use super::JsonResult;

pub async fn list_users(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Query(params): Query<UserListQuery>,
) -> JsonResult<UsersPage> {
    let page = paginate(params.page, params.limit);
    let (rows, total) =
        list_users_in_db(&pool, params.role, params.search.as_deref(), page).await?;

    let users = rows
        .into_iter()
        .map(|row| {
            let include_email = user_allows(maybe_user.get(), row.id, UserAction::ReadEmail);
            UserResponse::with_counts(row, include_email)
        })
        .collect();

    Ok(Json(UsersPage {
        users,
        pagination: PaginationMeta::new(total, page.page, page.limit),
    }))
}

pub async fn get_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
) -> JsonResult<UserWrapper> {
    let row = get_user_with_counts(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let include_email = user_allows(maybe_user.get(), id, UserAction::ReadEmail);

    Ok(Json(UserWrapper {
        user: UserResponse::with_counts(row, include_email),
    }))
}

pub async fn get_user_articles(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
    Query(params): Query<PageQuery>,
) -> JsonResult<ArticlesPage> {
    get_user_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;

    let page = paginate(params.page, params.limit);
    let filter = ArticleFilter {
        caller_id: maybe_user.get_id(),
        see_all: matches!(maybe_user.get(), Some(user) if user.role == Role::Admin),
        author_id: Some(id),
        ..Default::default()
    };
    let (rows, total) = list_articles_in_db(&pool, &filter, page).await?;

    let article_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut tag_map = tags_by_article(tags_for_articles(&pool, &article_ids).await?);
    let articles = rows
        .into_iter()
        .map(|row| {
            let tags = tag_map.remove(&row.id).unwrap_or_default();
            ArticleResponse::new(row, tags)
        })
        .collect();

    Ok(Json(ArticlesPage {
        articles,
        pagination: PaginationMeta::new(total, page.page, page.limit),
    }))
}

pub async fn delete_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<DeletedUserResponse> {
    if !user_allows(Some(&auth), id, UserAction::Delete) {
        return Err(RequestError::Forbidden("Access denied"));
    }

    let target = get_user_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    if auth.id == id {
        return Err(RequestError::Validation("Cannot delete your own account"));
    }

    delete_user_in_db(&pool, id).await?;
    tracing::info!(user_id = id, admin_id = auth.id, "user deleted");

    Ok(Json(DeletedUserResponse {
        message: "User deleted successfully",
        deleted_user: target.username,
    }))
}
