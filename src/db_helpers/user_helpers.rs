use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::{RegisterRequest, UpdateProfileRequest};
use crate::errors::{is_unique_violation, RequestError};
use crate::helpers::PageParams;
use crate::models::{Role, User, UserWithCounts};

use super::get_user_by_id;

const USER_WITH_COUNTS_QUERY: &str = r#"
            SELECT users.id                                        AS "id",
                   email                                           AS "email",
                   username                                        AS "username",
                   first_name                                      AS "first_name",
                   last_name                                       AS "last_name",
                   role                                            AS "role",
                   bio                                             AS "bio",
                   avatar                                          AS "avatar",
                   created_at                                      AS "created_at",
                   (SELECT Count(*)
                    FROM   articles
                    WHERE  articles.author_id = users.id)          AS "article_count",
                   (SELECT Count(*)
                    FROM   comments
                    WHERE  comments.user_id = users.id)            AS "comment_count",
                   (SELECT Count(*)
                    FROM   likes
                    WHERE  likes.user_id = users.id)               AS "like_count"
            FROM   users
            WHERE  users.id = $1
"#;

const LIST_USERS_QUERY: &str = r#"
            SELECT users.id                                        AS "id",
                   email                                           AS "email",
                   username                                        AS "username",
                   first_name                                      AS "first_name",
                   last_name                                       AS "last_name",
                   role                                            AS "role",
                   bio                                             AS "bio",
                   avatar                                          AS "avatar",
                   created_at                                      AS "created_at",
                   (SELECT Count(*)
                    FROM   articles
                    WHERE  articles.author_id = users.id)          AS "article_count",
                   (SELECT Count(*)
                    FROM   comments
                    WHERE  comments.user_id = users.id)            AS "comment_count",
                   (SELECT Count(*)
                    FROM   likes
                    WHERE  likes.user_id = users.id)               AS "like_count"
            FROM   users
            WHERE  ( $1 IS NULL
                      OR role = $1 )
              AND  ( $2 IS NULL
                      OR Lower(username) LIKE '%' || Lower($2) || '%'
                      OR Lower(Coalesce(first_name, '')) LIKE '%' || Lower($2) || '%'
                      OR Lower(Coalesce(last_name, '')) LIKE '%' || Lower($2) || '%' )
            ORDER  BY created_at DESC, users.id DESC
            LIMIT  $3 OFFSET $4
"#;

const COUNT_USERS_QUERY: &str = r#"
            SELECT Count(*)
            FROM   users
            WHERE  ( $1 IS NULL
                      OR role = $1 )
              AND  ( $2 IS NULL
                      OR Lower(username) LIKE '%' || Lower($2) || '%'
                      OR Lower(Coalesce(first_name, '')) LIKE '%' || Lower($2) || '%'
                      OR Lower(Coalesce(last_name, '')) LIKE '%' || Lower($2) || '%' )
"#;

pub async fn insert_user(
    pool: &SqlitePool,
    request: &RegisterRequest,
    password_hash: &str,
) -> Result<User, RequestError> {
    let role = request.role.unwrap_or(Role::Author);
    sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (email, username, password, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, email, username, password, first_name, last_name, role, bio, avatar, created_at
        "#,
    )
    .bind(&request.email)
    .bind(&request.username)
    .bind(password_hash)
    .bind(&request.first_name)
    .bind(&request.last_name)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|error| {
        // Lost the pre-check race against a concurrent registration.
        if is_unique_violation(&error) {
            let field = match &error {
                sqlx::Error::Database(db_error)
                    if db_error.message().contains("users.username") =>
                {
                    "username"
                }
                _ => "email",
            };
            RequestError::DuplicateUser { field }
        } else {
            error.into()
        }
    })
}

pub async fn find_user_by_email_or_username(
    pool: &SqlitePool,
    email: &str,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>(
        r#"
        SELECT id, email, username, password, first_name, last_name, role, bio, avatar, created_at
        FROM users WHERE email = $1 OR username = $2
        LIMIT 1
        "#,
    )
    .bind(email)
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn get_user_with_counts(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<UserWithCounts>, RequestError> {
    let result = sqlx::query_as::<Sqlite, UserWithCounts>(USER_WITH_COUNTS_QUERY)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn list_users_in_db(
    pool: &SqlitePool,
    role: Option<Role>,
    search: Option<&str>,
    page: PageParams,
) -> Result<(Vec<UserWithCounts>, i64), RequestError> {
    let users = sqlx::query_as::<Sqlite, UserWithCounts>(LIST_USERS_QUERY)
        .bind(role)
        .bind(search)
        .bind(i64::from(page.limit))
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

    let (total,): (i64,) = sqlx::query_as(COUNT_USERS_QUERY)
        .bind(role)
        .bind(search)
        .fetch_one(pool)
        .await?;

    Ok((users, total))
}

pub async fn update_profile_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateProfileRequest {
        first_name,
        last_name,
        bio,
        avatar,
    }: UpdateProfileRequest,
) -> Result<User, RequestError> {
    sqlx::query(
        r#"
        UPDATE users
        SET first_name = COALESCE($1, first_name),
            last_name  = COALESCE($2, last_name),
            bio        = COALESCE($3, bio),
            avatar     = COALESCE($4, avatar)
        WHERE id = $5
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(bio)
    .bind(avatar)
    .bind(id)
    .execute(pool)
    .await?;

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

pub async fn delete_user_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    Ok(())
}
