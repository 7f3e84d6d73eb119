//! Response envelopes. Mutations carry a human-readable `message` next to
//! the resource, listings pair the page with its pagination metadata.

use serde::Serialize;

use super::response::{
    ArticleResponse, CommentResponse, LikeResponse, PaginationMeta, UserResponse,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserWrapper {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct ProfileEnvelope {
    pub message: &'static str,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UsersPage {
    pub users: Vec<UserResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUserResponse {
    pub message: &'static str,
    pub deleted_user: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleEnvelope {
    pub message: &'static str,
    pub article: ArticleResponse,
}

#[derive(Debug, Serialize)]
pub struct ArticleWrapper {
    pub article: ArticleResponse,
}

#[derive(Debug, Serialize)]
pub struct ArticlesPage {
    pub articles: Vec<ArticleResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct CommentEnvelope {
    pub message: &'static str,
    pub comment: CommentResponse,
}

#[derive(Debug, Serialize)]
pub struct CommentsPage {
    pub comments: Vec<CommentResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub message: &'static str,
    pub like_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Serialize)]
pub struct LikesList {
    pub likes: Vec<LikeResponse>,
    pub count: usize,
}
