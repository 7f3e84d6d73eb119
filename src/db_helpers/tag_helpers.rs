use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::errors::RequestError;
use crate::helpers::slugify;
use crate::models::{ArticleTagRow, Tag};

use super::id_list;

/// Find-or-create each tag by name and link it to the article. Duplicate
/// names in the request collapse onto the same link row.
pub(crate) async fn attach_tags(
    tx: &mut Transaction<'_, Sqlite>,
    article_id: i64,
    tags: &[String],
) -> Result<(), RequestError> {
    for name in tags {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let (tag_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = excluded.name
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(slugify(name))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO article_tags (article_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}

pub(crate) async fn clear_article_tags(
    tx: &mut Transaction<'_, Sqlite>,
    article_id: i64,
) -> Result<(), RequestError> {
    sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
        .bind(article_id)
        .execute(&mut *tx)
        .await?;
    Ok(())
}

pub async fn tags_for_article(pool: &SqlitePool, article_id: i64) -> Result<Vec<Tag>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Tag>(
        r#"
        SELECT tags.id AS "id", tags.name AS "name", tags.slug AS "slug"
        FROM tags
            JOIN article_tags
                ON article_tags.tag_id = tags.id
        WHERE article_tags.article_id = $1
        ORDER BY tags.name
        "#,
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}

/// Batch lookup for listings, keyed by article id on the way out.
pub async fn tags_for_articles(
    pool: &SqlitePool,
    article_ids: &[i64],
) -> Result<Vec<ArticleTagRow>, RequestError> {
    if article_ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = format!(
        r#"
        SELECT article_tags.article_id AS "article_id",
               tags.id                 AS "id",
               tags.name               AS "name",
               tags.slug               AS "slug"
        FROM tags
            JOIN article_tags
                ON article_tags.tag_id = tags.id
        WHERE article_tags.article_id IN {}
        ORDER BY tags.name
        "#,
        id_list(article_ids)
    );
    let result = sqlx::query_as::<Sqlite, ArticleTagRow>(&query)
        .fetch_all(pool)
        .await?;
    Ok(result)
}
