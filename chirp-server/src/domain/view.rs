use chrono::{DateTime, Utc};
use serde::Serialize;

use super::post::{Comment, Post};
use super::user::UserView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CommentWithAuthor {
    pub(crate) comment: Comment,
    pub(crate) comment_author: UserView,
}

/// Post row with every comment resolved to its author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct EnrichedPost {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) emoji: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) comments: Vec<CommentWithAuthor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PostWithAuthor {
    pub(crate) post: EnrichedPost,
    pub(crate) author: UserView,
}

impl EnrichedPost {
    pub(crate) fn from_post(post: Post, comments: Vec<CommentWithAuthor>) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            emoji: post.emoji,
            created_at: post.created_at,
            comments,
        }
    }
}
