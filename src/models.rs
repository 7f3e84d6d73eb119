use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Author,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ArticleStatus {
    Draft,
    Submitted,
    Published,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: ArticleStatus,
    pub published_at: Option<NaiveDateTime>,
    pub author_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub article_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Article joined with its author plus derived counters, as produced by the
/// listing and detail queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: ArticleStatus,
    pub published_at: Option<NaiveDateTime>,
    pub author_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub author_username: String,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub author_avatar: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub is_liked: bool,
}

/// Comment joined with its author summary.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub content: String,
    pub article_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub user_username: String,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_avatar: Option<String>,
}

/// User joined with per-resource counters for the directory and profile
/// endpoints.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithCounts {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
    pub article_count: i64,
    pub comment_count: i64,
    pub like_count: i64,
}

/// A like joined with the liking user's summary.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LikeRow {
    pub user_id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Tag together with the article it is attached to, for batch lookups.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleTagRow {
    pub article_id: i64,
    pub id: i64,
    pub name: String,
    pub slug: String,
}
