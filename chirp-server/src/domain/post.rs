use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::emoji::{DEFAULT_EMOJI, is_single_emoji};
use super::error::DomainError;

pub(crate) const MAX_CONTENT_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) emoji: String,
    pub(crate) created_at: DateTime<Utc>,
    /// Newest first.
    pub(crate) comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) content: String,
    pub(crate) emoji: Option<String>,
}

impl CreatePostRequest {
    /// Returns the content and the emoji to store, falling back to the placeholder.
    pub(crate) fn validate(self) -> Result<(String, String), DomainError> {
        let content = validate_content(self.content)?;
        let emoji = match self.emoji {
            Some(emoji) => validate_emoji(emoji)?,
            None => DEFAULT_EMOJI.to_string(),
        };
        Ok((content, emoji))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AddCommentRequest {
    pub(crate) post_id: i64,
    pub(crate) content: String,
}

impl AddCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("post_id", self.post_id)?;
        Ok(Self {
            post_id: self.post_id,
            content: validate_content(self.content)?,
        })
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        author_id: impl Into<String>,
        content: impl Into<String>,
        emoji: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        let author_id = validate_author_id(author_id.into())?;
        let content = validate_content(content.into())?;
        let emoji = validate_emoji(emoji.into())?;

        Ok(Self {
            id,
            author_id,
            content,
            emoji,
            created_at,
            comments: Vec::new(),
        })
    }

    pub(crate) fn with_comments(mut self, mut comments: Vec<Comment>) -> Self {
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        self.comments = comments;
        self
    }
}

impl Comment {
    pub(crate) fn new(
        id: i64,
        post_id: i64,
        author_id: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("post_id", post_id)?;
        let author_id = validate_author_id(author_id.into())?;
        let content = validate_content(content.into())?;

        Ok(Self {
            id,
            post_id,
            author_id,
            content,
            created_at,
        })
    }
}

/// Ownership check against the session identity. Runs before any store access.
pub(crate) fn ensure_same_author(
    actor_user_id: &str,
    claimed_author_id: &str,
) -> Result<(), DomainError> {
    if actor_user_id != claimed_author_id {
        return Err(DomainError::Unauthorized);
    }
    Ok(())
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn validate_author_id(author_id: String) -> Result<String, DomainError> {
    if author_id.trim().is_empty() {
        return Err(DomainError::Validation {
            field: "author_id",
            message: "must not be empty",
        });
    }
    Ok(author_id)
}

// Content is stored verbatim; whitespace counts toward the limit.
fn validate_content(content: String) -> Result<String, DomainError> {
    let len = content.chars().count();
    if len == 0 || len > MAX_CONTENT_CHARS {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be 1..280 chars",
        });
    }
    Ok(content)
}

fn validate_emoji(emoji: String) -> Result<String, DomainError> {
    if !is_single_emoji(&emoji) {
        return Err(DomainError::Validation {
            field: "emoji",
            message: "must be exactly one emoji",
        });
    }
    Ok(emoji)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{
        AddCommentRequest, Comment, CreatePostRequest, DomainError, Post, ensure_same_author,
    };

    #[test]
    fn create_post_request_keeps_content_verbatim() {
        let req = CreatePostRequest {
            content: "  hello  ".to_string(),
            emoji: Some("🔥".to_string()),
        };

        let (content, emoji) = req.validate().expect("must validate");
        assert_eq!(content, "  hello  ");
        assert_eq!(emoji, "🔥");
    }

    #[test]
    fn create_post_request_defaults_missing_emoji() {
        let req = CreatePostRequest {
            content: "hello".to_string(),
            emoji: None,
        };

        let (_, emoji) = req.validate().expect("must validate");
        assert_eq!(emoji, "💬");
    }

    #[test]
    fn create_post_request_rejects_empty_and_oversized_content() {
        for content in [String::new(), "x".repeat(281)] {
            let req = CreatePostRequest {
                content,
                emoji: None,
            };
            let err = req.validate().expect_err("content must be rejected");
            assert_validation_field(err, "content");
        }
    }

    #[test]
    fn create_post_request_counts_chars_not_bytes() {
        let req = CreatePostRequest {
            content: "ж".repeat(280),
            emoji: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_post_request_rejects_bad_emoji() {
        for emoji in ["", "ab", "😀😀"] {
            let req = CreatePostRequest {
                content: "hello".to_string(),
                emoji: Some(emoji.to_string()),
            };
            let err = req.validate().expect_err("emoji must be rejected");
            assert_validation_field(err, "emoji");
        }
    }

    #[test]
    fn add_comment_request_rejects_non_positive_post_id() {
        let req = AddCommentRequest {
            post_id: 0,
            content: "nice".to_string(),
        };
        let err = req.validate().expect_err("post_id must be rejected");
        assert_validation_field(err, "post_id");
    }

    #[test]
    fn with_comments_orders_newest_first() {
        let now = Utc::now();
        let older = Comment::new(1, 7, "user_a", "first", now).expect("valid comment");
        let newer = Comment::new(2, 7, "user_b", "second", now + Duration::seconds(5))
            .expect("valid comment");

        let post = Post::new(7, "user_a", "body", "😀", now)
            .expect("valid post")
            .with_comments(vec![older, newer]);

        let ids: Vec<i64> = post.comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn post_new_rejects_blank_author() {
        let err = Post::new(1, "  ", "body", "😀", Utc::now()).expect_err("author must be set");
        assert_validation_field(err, "author_id");
    }

    #[test]
    fn ensure_same_author_rejects_mismatch() {
        assert!(ensure_same_author("user_a", "user_a").is_ok());
        let err = ensure_same_author("user_b", "user_a").expect_err("must be rejected");
        assert!(matches!(err, DomainError::Unauthorized));
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
