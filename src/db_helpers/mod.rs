use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;
use crate::models::User;

mod article_helpers;
mod comment_helpers;
mod like_helpers;
mod tag_helpers;
mod user_helpers;

pub use article_helpers::*;
pub use comment_helpers::*;
pub use like_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

// ----------------- Shared Helpers -----------------

/// Render ids as a parenthesized IN list. Only ever fed ids that came out of
/// this database, never raw user input.
fn id_list(ids: &[i64]) -> String {
    let mut list = String::from("(");
    for (index, id) in ids.iter().enumerate() {
        if index > 0 {
            list.push(',');
        }
        list.push_str(&id.to_string());
    }
    list.push(')');
    list
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>(
        r#"
        SELECT id, email, username, password, first_name, last_name, role, bio, avatar, created_at
        FROM users WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>(
        r#"
        SELECT id, email, username, password, first_name, last_name, role, bio, avatar, created_at
        FROM users WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}
