use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::{CreateArticleRequest, UpdateArticleRequest};
use crate::errors::RequestError;
use crate::helpers::{derive_excerpt, slugify, PageParams};
use crate::models::{Article, ArticleRow, ArticleStatus};

use super::tag_helpers::{attach_tags, clear_article_tags};

const LIST_ARTICLES_QUERY: &str = r#"
            SELECT articles.id                                    AS "id",
                   articles.title                                 AS "title",
                   articles.slug                                  AS "slug",
                   articles.content                               AS "content",
                   articles.excerpt                               AS "excerpt",
                   articles.featured_image                        AS "featured_image",
                   articles.status                                AS "status",
                   articles.published_at                          AS "published_at",
                   articles.author_id                             AS "author_id",
                   articles.created_at                            AS "created_at",
                   articles.updated_at                            AS "updated_at",
                   users.username                                 AS "author_username",
                   users.first_name                               AS "author_first_name",
                   users.last_name                                AS "author_last_name",
                   users.avatar                                   AS "author_avatar",
                   (SELECT Count(*)
                    FROM   likes
                    WHERE  likes.article_id = articles.id)        AS "like_count",
                   (SELECT Count(*)
                    FROM   comments
                    WHERE  comments.article_id = articles.id)     AS "comment_count",
                   EXISTS (SELECT 1
                           FROM   likes
                           WHERE  likes.article_id = articles.id
                              AND likes.user_id = $1)             AS "is_liked"
            FROM   articles
                JOIN users
                    ON articles.author_id = users.id
            WHERE  ( $2 IS NULL
                      OR articles.status = $2 )
              AND  ( $3 IS NULL
                      OR articles.author_id = $3 )
              AND  ( $4 IS NULL
                      OR Lower(users.username) LIKE '%' || Lower($4) || '%' )
              AND  ( $5 IS NULL
                      OR Lower(articles.title) LIKE '%' || Lower($5) || '%'
                      OR Lower(articles.content) LIKE '%' || Lower($5) || '%' )
              AND  ( $6
                      OR articles.status = 'PUBLISHED'
                      OR articles.author_id = $1 )
            ORDER  BY articles.created_at DESC, articles.id DESC
            LIMIT  $7 OFFSET $8
"#;

const COUNT_ARTICLES_QUERY: &str = r#"
            SELECT Count(*)
            FROM   articles
                JOIN users
                    ON articles.author_id = users.id
            WHERE  ( $1 IS NULL
                      OR articles.status = $1 )
              AND  ( $2 IS NULL
                      OR articles.author_id = $2 )
              AND  ( $3 IS NULL
                      OR Lower(users.username) LIKE '%' || Lower($3) || '%' )
              AND  ( $4 IS NULL
                      OR Lower(articles.title) LIKE '%' || Lower($4) || '%'
                      OR Lower(articles.content) LIKE '%' || Lower($4) || '%' )
              AND  ( $5
                      OR articles.status = 'PUBLISHED'
                      OR articles.author_id = $6 )
"#;

const SINGLE_ARTICLE_QUERY: &str = r#"
            SELECT articles.id                                    AS "id",
                   articles.title                                 AS "title",
                   articles.slug                                  AS "slug",
                   articles.content                               AS "content",
                   articles.excerpt                               AS "excerpt",
                   articles.featured_image                        AS "featured_image",
                   articles.status                                AS "status",
                   articles.published_at                          AS "published_at",
                   articles.author_id                             AS "author_id",
                   articles.created_at                            AS "created_at",
                   articles.updated_at                            AS "updated_at",
                   users.username                                 AS "author_username",
                   users.first_name                               AS "author_first_name",
                   users.last_name                                AS "author_last_name",
                   users.avatar                                   AS "author_avatar",
                   (SELECT Count(*)
                    FROM   likes
                    WHERE  likes.article_id = articles.id)        AS "like_count",
                   (SELECT Count(*)
                    FROM   comments
                    WHERE  comments.article_id = articles.id)     AS "comment_count",
                   EXISTS (SELECT 1
                           FROM   likes
                           WHERE  likes.article_id = articles.id
                              AND likes.user_id = $1)             AS "is_liked"
            FROM   articles
                JOIN users
                    ON articles.author_id = users.id
            WHERE  articles.id = $2
"#;

/// Filters for the listing endpoints. `see_all` is the admin bypass of the
/// published-or-own visibility rule.
#[derive(Debug, Default)]
pub struct ArticleFilter {
    pub caller_id: Option<i64>,
    pub see_all: bool,
    pub status: Option<ArticleStatus>,
    pub author_id: Option<i64>,
    pub author: Option<String>,
    pub search: Option<String>,
}

pub async fn list_articles_in_db(
    pool: &SqlitePool,
    filter: &ArticleFilter,
    page: PageParams,
) -> Result<(Vec<ArticleRow>, i64), RequestError> {
    let articles = sqlx::query_as::<Sqlite, ArticleRow>(LIST_ARTICLES_QUERY)
        .bind(filter.caller_id)
        .bind(filter.status)
        .bind(filter.author_id)
        .bind(&filter.author)
        .bind(&filter.search)
        .bind(filter.see_all)
        .bind(i64::from(page.limit))
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

    let (total,): (i64,) = sqlx::query_as(COUNT_ARTICLES_QUERY)
        .bind(filter.status)
        .bind(filter.author_id)
        .bind(&filter.author)
        .bind(&filter.search)
        .bind(filter.see_all)
        .bind(filter.caller_id)
        .fetch_one(pool)
        .await?;

    Ok((articles, total))
}

pub async fn get_article_row(
    pool: &SqlitePool,
    id: i64,
    caller_id: Option<i64>,
) -> Result<Option<ArticleRow>, RequestError> {
    let result = sqlx::query_as::<Sqlite, ArticleRow>(SINGLE_ARTICLE_QUERY)
        .bind(caller_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_article_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Article>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Article>(
        r#"
        SELECT id, title, slug, content, excerpt, featured_image, status, published_at,
               author_id, created_at, updated_at
        FROM articles WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

/// Probe for a free slug: the slugified title as-is, then `base-1`,
/// `base-2`, … until no other article holds it. An article keeps its own
/// slug when the title re-slugifies to it.
async fn generate_unique_slug(
    tx: &mut Transaction<'_, Sqlite>,
    title: &str,
    current_slug: Option<&str>,
) -> Result<String, RequestError> {
    let base = slugify(title);
    let mut slug = base.clone();
    let mut counter = 1;
    loop {
        if Some(slug.as_str()) == current_slug {
            return Ok(slug);
        }
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM articles WHERE slug = $1")
            .bind(&slug)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(slug);
        }
        slug = format!("{base}-{counter}");
        counter += 1;
    }
}

pub async fn create_article_in_db(
    pool: &SqlitePool,
    author_id: i64,
    CreateArticleRequest {
        title,
        content,
        excerpt,
        featured_image,
        tags,
    }: CreateArticleRequest,
) -> Result<ArticleRow, RequestError> {
    let title = title.trim();
    let content = content.trim();
    let mut tx = pool.begin().await?;

    let slug = generate_unique_slug(&mut tx, title, None).await?;
    let excerpt = excerpt.unwrap_or_else(|| derive_excerpt(content));

    let (article_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO articles (title, slug, content, excerpt, featured_image, author_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(&slug)
    .bind(content)
    .bind(&excerpt)
    .bind(&featured_image)
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;

    if let Some(tags) = tags {
        attach_tags(&mut tx, article_id, &tags).await?;
    }
    tx.commit().await?;

    match get_article_row(pool, article_id, Some(author_id)).await? {
        Some(row) => Ok(row),
        None => Err(RequestError::ServerError("article missing after insert")),
    }
}

pub async fn update_article_in_db(
    pool: &SqlitePool,
    existing: &Article,
    caller_id: i64,
    UpdateArticleRequest {
        title,
        content,
        excerpt,
        featured_image,
        tags,
    }: UpdateArticleRequest,
) -> Result<ArticleRow, RequestError> {
    let title = title.map(|title| title.trim().to_string());
    let content = content.map(|content| content.trim().to_string());
    let mut tx = pool.begin().await?;

    let slug = match &title {
        Some(new_title) if *new_title != existing.title => {
            Some(generate_unique_slug(&mut tx, new_title, Some(existing.slug.as_str())).await?)
        }
        _ => None,
    };
    let excerpt = match excerpt {
        Some(excerpt) => Some(excerpt),
        None => content.as_deref().map(derive_excerpt),
    };

    sqlx::query(
        r#"
        UPDATE articles
        SET title          = COALESCE($1, title),
            slug           = COALESCE($2, slug),
            content        = COALESCE($3, content),
            excerpt        = COALESCE($4, excerpt),
            featured_image = COALESCE($5, featured_image),
            updated_at     = CURRENT_TIMESTAMP
        WHERE id = $6
        "#,
    )
    .bind(&title)
    .bind(&slug)
    .bind(&content)
    .bind(&excerpt)
    .bind(&featured_image)
    .bind(existing.id)
    .execute(&mut tx)
    .await?;

    if let Some(tags) = tags {
        clear_article_tags(&mut tx, existing.id).await?;
        attach_tags(&mut tx, existing.id, &tags).await?;
    }
    tx.commit().await?;

    match get_article_row(pool, existing.id, Some(caller_id)).await? {
        Some(row) => Ok(row),
        None => Err(RequestError::NotFound("Article not found")),
    }
}

pub async fn delete_article_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Article not found"));
    }
    Ok(())
}

pub async fn publish_article_in_db(
    pool: &SqlitePool,
    id: i64,
    caller_id: i64,
) -> Result<ArticleRow, RequestError> {
    let result = sqlx::query(
        r#"
        UPDATE articles
        SET status       = 'PUBLISHED',
            published_at = CURRENT_TIMESTAMP,
            updated_at   = CURRENT_TIMESTAMP
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Article not found"));
    }

    match get_article_row(pool, id, Some(caller_id)).await? {
        Some(row) => Ok(row),
        None => Err(RequestError::NotFound("Article not found")),
    }
}
