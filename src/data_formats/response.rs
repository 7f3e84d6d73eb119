use serde::Serialize;

use crate::models::{
    ArticleRow, ArticleStatus, CommentRow, LikeRow, Role, Tag, User, UserWithCounts,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserCounts {
    pub articles: i64,
    pub comments: i64,
    pub likes: i64,
}

/// User record with the password stripped; email appears only when the
/// caller is allowed to see it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<UserCounts>,
}

impl UserResponse {
    pub fn new(
        User {
            id,
            email,
            username,
            first_name,
            last_name,
            role,
            bio,
            avatar,
            created_at,
            ..
        }: User,
        include_email: bool,
    ) -> Self {
        UserResponse {
            id,
            email: include_email.then_some(email),
            username,
            first_name,
            last_name,
            role,
            bio,
            avatar,
            created_at: created_at.to_string(),
            counts: None,
        }
    }

    pub fn with_counts(
        UserWithCounts {
            id,
            email,
            username,
            first_name,
            last_name,
            role,
            bio,
            avatar,
            created_at,
            article_count,
            comment_count,
            like_count,
        }: UserWithCounts,
        include_email: bool,
    ) -> Self {
        UserResponse {
            id,
            email: include_email.then_some(email),
            username,
            first_name,
            last_name,
            role,
            bio,
            avatar,
            created_at: created_at.to_string(),
            counts: Some(UserCounts {
                articles: article_count,
                comments: comment_count,
                likes: like_count,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(Tag { id, name, slug }: Tag) -> Self {
        TagResponse { id, name, slug }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleCounts {
    pub likes: i64,
    pub comments: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: ArticleStatus,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author: UserSummary,
    pub tags: Vec<TagResponse>,
    pub counts: ArticleCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
}

impl ArticleResponse {
    pub fn new(row: ArticleRow, tags: Vec<Tag>) -> Self {
        let ArticleRow {
            id,
            title,
            slug,
            content,
            excerpt,
            featured_image,
            status,
            published_at,
            author_id,
            created_at,
            updated_at,
            author_username,
            author_first_name,
            author_last_name,
            author_avatar,
            like_count,
            comment_count,
            ..
        } = row;
        ArticleResponse {
            id,
            title,
            slug,
            content,
            excerpt,
            featured_image,
            status,
            published_at: published_at.map(|at| at.to_string()),
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
            author: UserSummary {
                id: author_id,
                username: author_username,
                first_name: author_first_name,
                last_name: author_last_name,
                avatar: author_avatar,
            },
            tags: tags.into_iter().map(TagResponse::from).collect(),
            counts: ArticleCounts {
                likes: like_count,
                comments: comment_count,
            },
            comments: None,
            is_liked: None,
        }
    }

    /// Detail view: top-level comments with replies and the caller's like
    /// state attached.
    pub fn detailed(
        row: ArticleRow,
        tags: Vec<Tag>,
        comments: Vec<CommentResponse>,
        is_liked: bool,
    ) -> Self {
        let mut response = ArticleResponse::new(row, tags);
        response.comments = Some(comments);
        response.is_liked = Some(is_liked);
        response
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub article_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<CommentResponse>>,
}

impl CommentResponse {
    pub fn new(row: CommentRow, replies: Option<Vec<CommentResponse>>) -> Self {
        let CommentRow {
            id,
            content,
            article_id,
            user_id,
            parent_id,
            created_at,
            updated_at,
            user_username,
            user_first_name,
            user_last_name,
            user_avatar,
        } = row;
        CommentResponse {
            id,
            content,
            article_id,
            user_id,
            parent_id,
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
            user: UserSummary {
                id: user_id,
                username: user_username,
                first_name: user_first_name,
                last_name: user_last_name,
                avatar: user_avatar,
            },
            replies,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub user: UserSummary,
    pub created_at: String,
}

impl From<LikeRow> for LikeResponse {
    fn from(
        LikeRow {
            user_id,
            username,
            first_name,
            last_name,
            avatar,
            created_at,
        }: LikeRow,
    ) -> Self {
        LikeResponse {
            user: UserSummary {
                id: user_id,
                username,
                first_name,
                last_name,
                avatar,
            },
            created_at: created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let limit_wide = i64::from(limit.max(1));
        let total_pages = (total + limit_wide - 1) / limit_wide;
        PaginationMeta {
            total,
            page,
            limit,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_meta_matches_page_math() {
        let meta = PaginationMeta::new(25, 2, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let meta = PaginationMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }
}
