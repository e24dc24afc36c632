use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) emoji: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
}

/// Posts returned from listing operations carry their comments, newest first.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn list_recent(&self, limit: i64) -> Result<Vec<Post>, DomainError>;
    async fn list_by_author(&self, author_id: &str, limit: i64) -> Result<Vec<Post>, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    /// Deletes the post and all its comments as one unit.
    /// Returns the number of removed comments, or `None` when no post with
    /// this id is owned by `owner_id`.
    async fn delete_post_owned(&self, post_id: i64, owner_id: &str)
    -> Result<Option<u64>, DomainError>;
    async fn delete_comment_owned(&self, comment_id: i64, owner_id: &str)
    -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn list_recent(&self, limit: i64) -> Result<Vec<Post>, DomainError> {
        (**self).list_recent(limit).await
    }

    async fn list_by_author(&self, author_id: &str, limit: i64) -> Result<Vec<Post>, DomainError> {
        (**self).list_by_author(author_id, limit).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        (**self).create_comment(input).await
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        (**self).get_comment(id).await
    }

    async fn delete_post_owned(
        &self,
        post_id: i64,
        owner_id: &str,
    ) -> Result<Option<u64>, DomainError> {
        (**self).delete_post_owned(post_id, owner_id).await
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: &str,
    ) -> Result<bool, DomainError> {
        (**self).delete_comment_owned(comment_id, owner_id).await
    }
}
