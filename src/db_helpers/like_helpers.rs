use sqlx::{Sqlite, SqlitePool};

use crate::errors::{is_unique_violation, RequestError};
use crate::models::LikeRow;

pub async fn insert_like(
    pool: &SqlitePool,
    article_id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    // The primary key on (article_id, user_id) settles concurrent duplicates.
    sqlx::query("INSERT INTO likes (article_id, user_id) VALUES ($1, $2)")
        .bind(article_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                RequestError::Conflict("Article already liked")
            } else {
                error.into()
            }
        })?;
    Ok(())
}

pub async fn delete_like(
    pool: &SqlitePool,
    article_id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM likes WHERE article_id = $1 AND user_id = $2")
        .bind(article_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Like not found"));
    }
    Ok(())
}

pub async fn count_likes(pool: &SqlitePool, article_id: i64) -> Result<i64, RequestError> {
    let (count,): (i64,) = sqlx::query_as("SELECT Count(*) FROM likes WHERE article_id = $1")
        .bind(article_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list_likes(pool: &SqlitePool, article_id: i64) -> Result<Vec<LikeRow>, RequestError> {
    let result = sqlx::query_as::<Sqlite, LikeRow>(
        r#"
        SELECT likes.user_id    AS "user_id",
               users.username   AS "username",
               users.first_name AS "first_name",
               users.last_name  AS "last_name",
               users.avatar     AS "avatar",
               likes.created_at AS "created_at"
        FROM   likes
            JOIN users
                ON likes.user_id = users.id
        WHERE  likes.article_id = $1
        ORDER  BY likes.created_at DESC, likes.user_id DESC
        "#,
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}
