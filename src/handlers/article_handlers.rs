use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::authentication::{AuthUser, MaybeUser};
use crate::data_formats::{
    ArticleEnvelope, ArticleListQuery, ArticleResponse, ArticleWrapper, ArticlesPage,
    CreateArticleRequest, LikeStatusResponse, LikesList, MessageResponse, PaginationMeta,
    UpdateArticleRequest,
};
use crate::db_helpers::{
    all_top_level_comments, count_likes, create_article_in_db, delete_article_in_db, delete_like,
    get_article_by_id, get_article_row, insert_like, list_articles_in_db, list_likes,
    publish_article_in_db, tags_for_article, tags_for_articles, update_article_in_db,
    ArticleFilter,
};
use crate::errors::RequestError;
use crate::helpers::paginate;
use crate::models::{ArticleTagRow, Role, Tag};
use crate::policy::{article_allows, ArticleAction};

use super::comment_handlers::with_replies;
use super::{CreatedResult, JsonResult};

pub(super) fn tags_by_article(rows: Vec<ArticleTagRow>) -> HashMap<i64, Vec<Tag>> {
    let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in rows {
        map.entry(row.article_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
            slug: row.slug,
        });
    }
    map
}

pub async fn create_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Json(request): Json<CreateArticleRequest>,
) -> CreatedResult<ArticleEnvelope> {
    request.validate()?;

    let row = create_article_in_db(&pool, auth.id, request).await?;
    let tags = tags_for_article(&pool, row.id).await?;
    tracing::info!(article_id = row.id, author_id = auth.id, "article created");

    Ok((
        StatusCode::CREATED,
        Json(ArticleEnvelope {
            message: "Article created successfully",
            article: ArticleResponse::new(row, tags),
        }),
    ))
}

pub async fn list_articles(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Query(params): Query<ArticleListQuery>,
) -> JsonResult<ArticlesPage> {
    let page = paginate(params.page, params.limit);
    let filter = match maybe_user.get() {
        Some(user) => ArticleFilter {
            caller_id: Some(user.id),
            see_all: user.role == Role::Admin,
            status: params.status,
            author: params.author,
            search: params.search,
            ..Default::default()
        },
        // Anonymous callers are pinned to published articles, whatever the
        // status filter says.
        None => ArticleFilter {
            author: params.author,
            search: params.search,
            ..Default::default()
        },
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

pub async fn get_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
) -> JsonResult<ArticleWrapper> {
    let row = get_article_row(&pool, id, maybe_user.get_id())
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;

    if !article_allows(
        maybe_user.get(),
        row.author_id,
        row.status,
        ArticleAction::View,
    ) {
        return Err(RequestError::Forbidden("Access denied"));
    }

    let tags = tags_for_article(&pool, row.id).await?;
    let top_level = all_top_level_comments(&pool, row.id).await?;
    let comments = with_replies(&pool, top_level).await?;
    let is_liked = row.is_liked;

    Ok(Json(ArticleWrapper {
        article: ArticleResponse::detailed(row, tags, comments, is_liked),
    }))
}

pub async fn update_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateArticleRequest>,
) -> JsonResult<ArticleEnvelope> {
    request.validate()?;

    let existing = get_article_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if !article_allows(
        Some(&auth),
        existing.author_id,
        existing.status,
        ArticleAction::Modify,
    ) {
        return Err(RequestError::Forbidden("Access denied"));
    }

    let row = update_article_in_db(&pool, &existing, auth.id, request).await?;
    let tags = tags_for_article(&pool, row.id).await?;

    Ok(Json(ArticleEnvelope {
        message: "Article updated successfully",
        article: ArticleResponse::new(row, tags),
    }))
}

pub async fn delete_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<MessageResponse> {
    let existing = get_article_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if !article_allows(
        Some(&auth),
        existing.author_id,
        existing.status,
        ArticleAction::Modify,
    ) {
        return Err(RequestError::Forbidden("Access denied"));
    }

    delete_article_in_db(&pool, id).await?;
    tracing::info!(article_id = id, caller_id = auth.id, "article deleted");

    Ok(Json(MessageResponse {
        message: "Article deleted successfully",
    }))
}

pub async fn publish_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<ArticleEnvelope> {
    let existing = get_article_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if !article_allows(
        Some(&auth),
        existing.author_id,
        existing.status,
        ArticleAction::Publish,
    ) {
        return Err(RequestError::Forbidden("Access denied"));
    }

    let row = publish_article_in_db(&pool, id, auth.id).await?;
    let tags = tags_for_article(&pool, row.id).await?;

    Ok(Json(ArticleEnvelope {
        message: "Article published successfully",
        article: ArticleResponse::new(row, tags),
    }))
}

pub async fn like_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<LikeStatusResponse> {
    get_article_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;

    insert_like(&pool, id, auth.id).await?;
    let like_count = count_likes(&pool, id).await?;

    Ok(Json(LikeStatusResponse {
        message: "Article liked successfully",
        like_count,
        is_liked: true,
    }))
}

pub async fn unlike_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<LikeStatusResponse> {
    delete_like(&pool, id, auth.id).await?;
    let like_count = count_likes(&pool, id).await?;

    Ok(Json(LikeStatusResponse {
        message: "Article unliked successfully",
        like_count,
        is_liked: false,
    }))
}

pub async fn get_article_likes(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> JsonResult<LikesList> {
    let likes: Vec<_> = list_likes(&pool, id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let count = likes.len();
    Ok(Json(LikesList { likes, count }))
}
