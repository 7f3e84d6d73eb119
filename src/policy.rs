//! Authorization policy, consolidated per resource so the ownership and
//! role rules live in one place instead of being repeated in every handler.
//! Handlers translate a deny into 403.

use crate::authentication::AuthUser;
use crate::models::{ArticleStatus, Role};

#[derive(Debug, Clone, Copy)]
pub enum ArticleAction {
    View,
    Modify,
    Publish,
}

#[derive(Debug, Clone, Copy)]
pub enum CommentAction {
    Modify,
}

#[derive(Debug, Clone, Copy)]
pub enum UserAction {
    ReadEmail,
    Delete,
}

fn is_admin(caller: Option<&AuthUser>) -> bool {
    matches!(caller, Some(user) if user.role == Role::Admin)
}

fn is_owner_or_admin(caller: Option<&AuthUser>, owner_id: i64) -> bool {
    match caller {
        Some(user) => user.id == owner_id || user.role == Role::Admin,
        None => false,
    }
}

/// Non-published articles are visible only to their author or an admin;
/// mutation is owner-or-admin; publishing is admin-only.
pub fn article_allows(
    caller: Option<&AuthUser>,
    author_id: i64,
    status: ArticleStatus,
    action: ArticleAction,
) -> bool {
    match action {
        ArticleAction::View => {
            status == ArticleStatus::Published || is_owner_or_admin(caller, author_id)
        }
        ArticleAction::Modify => is_owner_or_admin(caller, author_id),
        ArticleAction::Publish => is_admin(caller),
    }
}

pub fn comment_allows(caller: Option<&AuthUser>, owner_id: i64, action: CommentAction) -> bool {
    match action {
        CommentAction::Modify => is_owner_or_admin(caller, owner_id),
    }
}

/// Email addresses are private to the subject and admins; deletion is an
/// admin action (the self-deletion guard is a validation rule on top).
pub fn user_allows(caller: Option<&AuthUser>, subject_id: i64, action: UserAction) -> bool {
    match action {
        UserAction::ReadEmail => {
            matches!(caller, Some(user) if user.id == subject_id) || is_admin(caller)
        }
        UserAction::Delete => is_admin(caller),
    }
}
