use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::authentication::AuthUser;
use crate::data_formats::{
    CommentEnvelope, CommentResponse, CommentsPage, CreateCommentRequest, MessageResponse,
    PageQuery, PaginationMeta, UpdateCommentRequest,
};
use crate::db_helpers::{
    delete_comment_in_db, get_article_by_id, get_comment_by_id, insert_comment,
    list_top_level_comments, replies_for_comments, update_comment_in_db,
};
use crate::errors::RequestError;
use crate::helpers::paginate;
use crate::models::{ArticleStatus, CommentRow};
use crate::policy::{comment_allows, CommentAction};

use super::{CreatedResult, JsonResult};

/// Attach each top-level comment's replies, oldest first.
pub(super) async fn with_replies(
    pool: &SqlitePool,
    comments: Vec<CommentRow>,
) -> Result<Vec<CommentResponse>, RequestError> {
    let parent_ids: Vec<i64> = comments.iter().map(|comment| comment.id).collect();
    let mut replies_map: HashMap<i64, Vec<CommentResponse>> = HashMap::new();
    for reply in replies_for_comments(pool, &parent_ids).await? {
        if let Some(parent_id) = reply.parent_id {
            replies_map
                .entry(parent_id)
                .or_default()
                .push(CommentResponse::new(reply, None));
        }
    }
    Ok(comments
        .into_iter()
        .map(|comment| {
            let replies = replies_map.remove(&comment.id).unwrap_or_default();
            CommentResponse::new(comment, Some(replies))
        })
        .collect())
}

pub async fn create_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Json(request): Json<CreateCommentRequest>,
) -> CreatedResult<CommentEnvelope> {
    request.validate()?;

    let article = get_article_by_id(&pool, request.article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if article.status != ArticleStatus::Published {
        return Err(RequestError::Forbidden(
            "Cannot comment on unpublished article",
        ));
    }

    if let Some(parent_id) = request.parent_id {
        let parent = get_comment_by_id(&pool, parent_id)
            .await?
            .ok_or(RequestError::NotFound("Parent comment not found"))?;
        if parent.article_id != request.article_id {
            return Err(RequestError::Validation(
                "Parent comment must be on the same article",
            ));
        }
        // Threads are one level deep.
        if parent.parent_id.is_some() {
            return Err(RequestError::Validation("Cannot reply to a reply"));
        }
    }

    let row = insert_comment(
        &pool,
        auth.id,
        request.article_id,
        request.parent_id,
        request.content.trim(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentEnvelope {
            message: "Comment created successfully",
            comment: CommentResponse::new(row, Some(Vec::new())),
        }),
    ))
}

pub async fn get_article_comments(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(article_id): Path<i64>,
    Query(params): Query<PageQuery>,
) -> JsonResult<CommentsPage> {
    get_article_by_id(&pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;

    let page = paginate(params.page, params.limit);
    let (rows, total) = list_top_level_comments(&pool, article_id, page).await?;
    let comments = with_replies(&pool, rows).await?;

    Ok(Json(CommentsPage {
        comments,
        pagination: PaginationMeta::new(total, page.page, page.limit),
    }))
}

pub async fn update_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCommentRequest>,
) -> JsonResult<CommentEnvelope> {
    request.validate()?;

    let existing = get_comment_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    if !comment_allows(Some(&auth), existing.user_id, CommentAction::Modify) {
        return Err(RequestError::Forbidden("Access denied"));
    }

    let row = update_comment_in_db(&pool, id, request.content.trim()).await?;
    let comment = with_replies(&pool, vec![row])
        .await?
        .pop()
        .ok_or(RequestError::ServerError("comment missing after update"))?;

    Ok(Json(CommentEnvelope {
        message: "Comment updated successfully",
        comment,
    }))
}

pub async fn delete_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<MessageResponse> {
    let existing = get_comment_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    if !comment_allows(Some(&auth), existing.user_id, CommentAction::Modify) {
        return Err(RequestError::Forbidden("Access denied"));
    }

    // Replies go with their parent via the self-referential cascade.
    delete_comment_in_db(&pool, id).await?;

    Ok(Json(MessageResponse {
        message: "Comment deleted successfully",
    }))
}
