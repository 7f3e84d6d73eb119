use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::helpers::PageParams;
use crate::models::{Comment, CommentRow};

use super::id_list;

const SINGLE_COMMENT_QUERY: &str = r#"
            SELECT comments.id                                    AS "id",
                   comments.content                               AS "content",
                   comments.article_id                            AS "article_id",
                   comments.user_id                               AS "user_id",
                   comments.parent_id                             AS "parent_id",
                   comments.created_at                            AS "created_at",
                   comments.updated_at                            AS "updated_at",
                   users.username                                 AS "user_username",
                   users.first_name                               AS "user_first_name",
                   users.last_name                                AS "user_last_name",
                   users.avatar                                   AS "user_avatar"
            FROM   comments
                JOIN users
                    ON comments.user_id = users.id
            WHERE  comments.id = $1
"#;

const TOP_LEVEL_COMMENTS_QUERY: &str = r#"
            SELECT comments.id                                    AS "id",
                   comments.content                               AS "content",
                   comments.article_id                            AS "article_id",
                   comments.user_id                               AS "user_id",
                   comments.parent_id                             AS "parent_id",
                   comments.created_at                            AS "created_at",
                   comments.updated_at                            AS "updated_at",
                   users.username                                 AS "user_username",
                   users.first_name                               AS "user_first_name",
                   users.last_name                                AS "user_last_name",
                   users.avatar                                   AS "user_avatar"
            FROM   comments
                JOIN users
                    ON comments.user_id = users.id
            WHERE  comments.article_id = $1
              AND  comments.parent_id IS NULL
            ORDER  BY comments.created_at DESC, comments.id DESC
            LIMIT  $2 OFFSET $3
"#;

pub async fn insert_comment(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
    parent_id: Option<i64>,
    content: &str,
) -> Result<CommentRow, RequestError> {
    let (comment_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO comments (content, article_id, user_id, parent_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(content)
    .bind(article_id)
    .bind(user_id)
    .bind(parent_id)
    .fetch_one(pool)
    .await?;

    match get_comment_row(pool, comment_id).await? {
        Some(row) => Ok(row),
        None => Err(RequestError::ServerError("comment missing after insert")),
    }
}

pub async fn get_comment_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Comment>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Comment>(
        r#"
        SELECT id, content, article_id, user_id, parent_id, created_at, updated_at
        FROM comments WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn get_comment_row(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<CommentRow>, RequestError> {
    let result = sqlx::query_as::<Sqlite, CommentRow>(SINGLE_COMMENT_QUERY)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// One page of top-level comments, newest first, plus the page-independent
/// total used for pagination metadata.
pub async fn list_top_level_comments(
    pool: &SqlitePool,
    article_id: i64,
    page: PageParams,
) -> Result<(Vec<CommentRow>, i64), RequestError> {
    let comments = sqlx::query_as::<Sqlite, CommentRow>(TOP_LEVEL_COMMENTS_QUERY)
        .bind(article_id)
        .bind(i64::from(page.limit))
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

    let (total,): (i64,) = sqlx::query_as(
        "SELECT Count(*) FROM comments WHERE article_id = $1 AND parent_id IS NULL",
    )
    .bind(article_id)
    .fetch_one(pool)
    .await?;

    Ok((comments, total))
}

/// Every top-level comment of an article, newest first. The article detail
/// view embeds the full thread rather than a page of it.
pub async fn all_top_level_comments(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<CommentRow>, RequestError> {
    let result = sqlx::query_as::<Sqlite, CommentRow>(
        r#"
        SELECT comments.id                                    AS "id",
               comments.content                               AS "content",
               comments.article_id                            AS "article_id",
               comments.user_id                               AS "user_id",
               comments.parent_id                             AS "parent_id",
               comments.created_at                            AS "created_at",
               comments.updated_at                            AS "updated_at",
               users.username                                 AS "user_username",
               users.first_name                               AS "user_first_name",
               users.last_name                                AS "user_last_name",
               users.avatar                                   AS "user_avatar"
        FROM   comments
            JOIN users
                ON comments.user_id = users.id
        WHERE  comments.article_id = $1
          AND  comments.parent_id IS NULL
        ORDER  BY comments.created_at DESC, comments.id DESC
        "#,
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}

/// Replies for a batch of parent comments, oldest first so a thread reads
/// top to bottom.
pub async fn replies_for_comments(
    pool: &SqlitePool,
    parent_ids: &[i64],
) -> Result<Vec<CommentRow>, RequestError> {
    if parent_ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = format!(
        r#"
        SELECT comments.id                                    AS "id",
               comments.content                               AS "content",
               comments.article_id                            AS "article_id",
               comments.user_id                               AS "user_id",
               comments.parent_id                             AS "parent_id",
               comments.created_at                            AS "created_at",
               comments.updated_at                            AS "updated_at",
               users.username                                 AS "user_username",
               users.first_name                               AS "user_first_name",
               users.last_name                                AS "user_last_name",
               users.avatar                                   AS "user_avatar"
        FROM   comments
            JOIN users
                ON comments.user_id = users.id
        WHERE  comments.parent_id IN {}
        ORDER  BY comments.created_at ASC, comments.id ASC
        "#,
        id_list(parent_ids)
    );
    let result = sqlx::query_as::<Sqlite, CommentRow>(&query)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn update_comment_in_db(
    pool: &SqlitePool,
    id: i64,
    content: &str,
) -> Result<CommentRow, RequestError> {
    sqlx::query(
        "UPDATE comments SET content = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(content)
    .bind(id)
    .execute(pool)
    .await?;

    match get_comment_row(pool, id).await? {
        Some(row) => Ok(row),
        None => Err(RequestError::NotFound("Comment not found")),
    }
}

pub async fn delete_comment_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    Ok(())
}
