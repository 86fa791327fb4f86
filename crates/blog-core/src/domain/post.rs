use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationErrors;

/// Store-assigned post identifier.
pub type PostId = i64;

/// Upper bound on title length, counted in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Post entity - a blog entry. A post without `published_at` is a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_draft(&self) -> bool {
        self.published_at.is_none()
    }

    /// Whether the post belongs in the public listing at `now`.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|at| at <= now)
    }
}

/// A post that has not been stored yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(author: Uuid, content: PostContent, created_at: DateTime<Utc>) -> Self {
        Self {
            author,
            title: content.title,
            body: content.body,
            created_at,
        }
    }

    /// Materialize the stored record once an id has been assigned.
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            author: self.author,
            title: self.title,
            body: self.body,
            created_at: self.created_at,
            published_at: None,
        }
    }
}

/// Validated title and body, trimmed and within bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub body: String,
}

/// Title and body exactly as submitted by an author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Trim both fields and check them.
    ///
    /// Title is required and at most [`TITLE_MAX_CHARS`] characters long;
    /// body is required. All failing fields are reported together.
    pub fn validate(&self) -> Result<PostContent, ValidationErrors> {
        let title = self.title.trim();
        let body = self.body.trim();
        let mut errors = ValidationErrors::new();

        let title_len = title.chars().count();
        if title_len == 0 {
            errors.add("title", "This field is required.");
        } else if title_len > TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!(
                    "Ensure this value has at most {TITLE_MAX_CHARS} characters (it has {title_len})."
                ),
            );
        }

        if body.is_empty() {
            errors.add("body", "This field is required.");
        }

        errors.into_result(PostContent {
            title: title.to_string(),
            body: body.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn post(published_at: Option<DateTime<Utc>>) -> Post {
        NewPost::new(
            Uuid::new_v4(),
            PostContent {
                title: "Hello".to_string(),
                body: "World".to_string(),
            },
            Utc::now(),
        )
        .into_post(1)
        .with_published_at(published_at)
    }

    impl Post {
        fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
            self.published_at = published_at;
            self
        }
    }

    #[test]
    fn test_new_post_is_draft() {
        let post = post(None);
        assert!(post.is_draft());
        assert!(!post.is_visible_at(Utc::now()));
    }

    #[test]
    fn test_visibility_boundary_is_inclusive() {
        let at = Utc::now();
        let post = post(Some(at));

        assert!(post.is_visible_at(at));
        assert!(post.is_visible_at(at + Duration::seconds(1)));
        assert!(!post.is_visible_at(at - Duration::seconds(1)));
    }

    #[test]
    fn test_validate_trims_fields() {
        let content = PostDraft::new("  Hello ", "\nWorld\n").validate().unwrap();
        assert_eq!(content.title, "Hello");
        assert_eq!(content.body, "World");
    }

    #[test]
    fn test_validate_requires_title_and_body() {
        let errors = PostDraft::new("   ", "").validate().unwrap_err();
        assert_eq!(errors.field("title"), ["This field is required."]);
        assert_eq!(errors.field("body"), ["This field is required."]);
    }

    #[test]
    fn test_validate_title_length_limit() {
        let exact = "a".repeat(TITLE_MAX_CHARS);
        assert!(PostDraft::new(exact, "body").validate().is_ok());

        let too_long = "a".repeat(TITLE_MAX_CHARS + 1);
        let errors = PostDraft::new(too_long, "body").validate().unwrap_err();
        assert_eq!(errors.field("title").len(), 1);
        assert!(errors.field("body").is_empty());
    }

    #[test]
    fn test_title_length_counts_characters() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(title.len() > TITLE_MAX_CHARS);
        assert!(PostDraft::new(title, "body").validate().is_ok());
    }
}
