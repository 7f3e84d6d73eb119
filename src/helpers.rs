//! Pure helpers shared across resources: slug derivation, excerpt
//! truncation and pagination math.

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;
const EXCERPT_LENGTH: usize = 200;

/// Turn a title into a URL-safe slug: lowercase, punctuation stripped,
/// whitespace/underscore/dash runs collapsed to a single dash, no leading or
/// trailing dashes. Uniqueness is handled separately by the slug probe.
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_dash = true;
        }
    }
    slug
}

/// Excerpt shown in listings when the author did not supply one: the leading
/// part of the content, cut on a character boundary.
pub fn derive_excerpt(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= EXCERPT_LENGTH {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(EXCERPT_LENGTH).collect();
    format!("{}…", cut.trim_end())
}

#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
    pub offset: i64,
}

/// Clamp page/limit query values the same way for every listing endpoint.
pub fn paginate(page: Option<u32>, limit: Option<u32>) -> PageParams {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    let offset = (i64::from(page) - 1) * i64::from(limit);
    PageParams { page, limit, offset }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn slugify_collapses_separator_runs() {
        assert_eq!(slugify("rust __ async  --  tips"), "rust-async-tips");
        assert_eq!(slugify("  --Leading and trailing--  "), "leading-and-trailing");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Caffè Über 2024"), "caff-ber-2024");
    }

    #[test]
    fn excerpt_keeps_short_content() {
        assert_eq!(derive_excerpt("short post"), "short post");
    }

    #[test]
    fn excerpt_truncates_long_content() {
        let content = "x".repeat(500);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_LENGTH + 1);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn paginate_clamps_and_offsets() {
        let params = paginate(None, None);
        assert_eq!((params.page, params.limit, params.offset), (1, 10, 0));

        let params = paginate(Some(3), Some(25));
        assert_eq!((params.page, params.limit, params.offset), (3, 25, 50));

        let params = paginate(Some(0), Some(1000));
        assert_eq!((params.page, params.limit, params.offset), (1, 100, 0));
    }
}
