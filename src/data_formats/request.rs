//! Request bodies. Each carries an explicit `validate` that rejects bad
//! input with a 400 before any business logic runs.

use serde::Deserialize;

use crate::errors::RequestError;
use crate::models::Role;

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn is_valid_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ----------------- Auth Requests -----------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if !is_valid_email(&self.email) {
            return Err(RequestError::Validation("A valid email is required"));
        }
        let username = self.username.trim();
        if username.len() < 3 || username.len() > 30 {
            return Err(RequestError::Validation(
                "Username must be between 3 and 30 characters",
            ));
        }
        if self.password.len() < 6 {
            return Err(RequestError::Validation(
                "Password must be at least 6 characters",
            ));
        }
        for name in [&self.first_name, &self.last_name].into_iter().flatten() {
            if name.len() > 50 {
                return Err(RequestError::Validation(
                    "Names must be at most 50 characters",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if !is_valid_email(&self.email) {
            return Err(RequestError::Validation("A valid email is required"));
        }
        if self.password.is_empty() {
            return Err(RequestError::Validation("Password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        for name in [&self.first_name, &self.last_name].into_iter().flatten() {
            if name.len() > 50 {
                return Err(RequestError::Validation(
                    "Names must be at most 50 characters",
                ));
            }
        }
        if let Some(bio) = &self.bio {
            if bio.len() > 500 {
                return Err(RequestError::Validation(
                    "Bio must be at most 500 characters",
                ));
            }
        }
        if let Some(avatar) = &self.avatar {
            if !is_valid_url(avatar) {
                return Err(RequestError::Validation("Avatar must be a URL"));
            }
        }
        Ok(())
    }
}

// ----------------- Article Requests -----------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn validate_article_fields(
    title: Option<&str>,
    content: Option<&str>,
    excerpt: Option<&str>,
    featured_image: Option<&str>,
) -> Result<(), RequestError> {
    if let Some(title) = title {
        let title = title.trim();
        if title.is_empty() || title.len() > 200 {
            return Err(RequestError::Validation(
                "Title must be between 1 and 200 characters",
            ));
        }
    }
    if let Some(content) = content {
        if content.trim().is_empty() {
            return Err(RequestError::Validation("Content must not be empty"));
        }
    }
    if let Some(excerpt) = excerpt {
        if excerpt.len() > 500 {
            return Err(RequestError::Validation(
                "Excerpt must be at most 500 characters",
            ));
        }
    }
    if let Some(url) = featured_image {
        if !is_valid_url(url) {
            return Err(RequestError::Validation("Featured image must be a URL"));
        }
    }
    Ok(())
}

impl CreateArticleRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_article_fields(
            Some(self.title.as_str()),
            Some(self.content.as_str()),
            self.excerpt.as_deref(),
            self.featured_image.as_deref(),
        )
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdateArticleRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_article_fields(
            self.title.as_deref(),
            self.content.as_deref(),
            self.excerpt.as_deref(),
            self.featured_image.as_deref(),
        )
    }
}

// ----------------- Comment Requests -----------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub article_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

fn validate_comment_content(content: &str) -> Result<(), RequestError> {
    let content = content.trim();
    if content.is_empty() || content.len() > 1000 {
        return Err(RequestError::Validation(
            "Comment must be between 1 and 1000 characters",
        ));
    }
    Ok(())
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_comment_content(&self.content)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

impl UpdateCommentRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_comment_content(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "john@example.com".to_string(),
            username: "john".to_string(),
            password: "secret123".to_string(),
            first_name: None,
            last_name: None,
            role: None,
        }
    }

    #[test]
    fn register_accepts_well_formed_input() {
        assert!(register_request().validate().is_ok());
    }

    #[test]
    fn register_rejects_bad_email_and_short_fields() {
        let mut request = register_request();
        request.email = "not-an-email".to_string();
        assert!(request.validate().is_err());

        let mut request = register_request();
        request.username = "jo".to_string();
        assert!(request.validate().is_err());

        let mut request = register_request();
        request.password = "short".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn article_title_bounds_are_enforced() {
        let request = CreateArticleRequest {
            title: "  ".to_string(),
            content: "body".to_string(),
            excerpt: None,
            featured_image: None,
            tags: None,
        };
        assert!(request.validate().is_err());

        let request = CreateArticleRequest {
            title: "t".repeat(201),
            content: "body".to_string(),
            excerpt: None,
            featured_image: None,
            tags: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn comment_content_bounds_are_enforced() {
        assert!(validate_comment_content("hello").is_ok());
        assert!(validate_comment_content("   ").is_err());
        assert!(validate_comment_content(&"c".repeat(1001)).is_err());
    }
}
