mod repository;

pub use repository::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

/// [`Post`] joined with its author's username for display.
///
/// `author` is empty when the author row cannot be resolved; such an
/// entry is degraded, never dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostWithAuthor {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
}

impl Post {
    /// Create a new [`Post`] with a fresh identifier.
    ///
    /// `author_id` always comes from the authenticated identity, never
    /// from the request body.
    pub fn new(
        author_id: &str,
        title: String,
        summary: String,
        content: String,
        cover: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            summary,
            content,
            cover,
            author_id: author_id.to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// Ownership policy: whether `requester_id` may mutate `post`.
pub fn can_modify(requester_id: &str, post: &Post) -> bool {
    post.author_id == requester_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_modify() {
        let post = Post::new(
            "author-1",
            "title".into(),
            "summary".into(),
            "content".into(),
            None,
        );

        assert!(can_modify("author-1", &post));
        assert!(!can_modify("author-2", &post));
        // Case-sensitive, identifiers are opaque.
        assert!(!can_modify("Author-1", &post));
    }
}
