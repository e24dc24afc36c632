use std::sync::Arc;

use tracing::{info, warn};

use crate::application::author_enrichment::{enrich_comment, enrich_posts};
use crate::data::identity_provider::IdentityProvider;
use crate::data::post_repository::{NewComment, NewPost, PostRepository};
use crate::data::rate_limiter::RateLimiter;
use crate::domain::error::DomainError;
use crate::domain::post::{AddCommentRequest, Comment, CreatePostRequest, Post, ensure_same_author};
use crate::domain::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::domain::view::{CommentWithAuthor, PostWithAuthor};

/// Fixed page size for feed listings.
pub(crate) const FEED_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DeletedPost {
    pub(crate) post_id: i64,
    pub(crate) deleted_comments: u64,
}

pub(crate) struct PostsService<R: PostRepository, I: IdentityProvider> {
    repo: R,
    identity: I,
    limiter: Arc<dyn RateLimiter>,
}

impl<R: PostRepository, I: IdentityProvider> PostsService<R, I> {
    pub(crate) fn new(repo: R, identity: I, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            repo,
            identity,
            limiter,
        }
    }

    pub(crate) async fn list_all(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        let posts = self.repo.list_recent(FEED_LIMIT).await?;
        enrich_posts(&self.identity, posts).await
    }

    pub(crate) async fn list_by_author(
        &self,
        author_id: &str,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let posts = self.repo.list_by_author(author_id, FEED_LIMIT).await?;
        enrich_posts(&self.identity, posts).await
    }

    /// Zero or one post; a missing id is an empty result, not an error.
    pub(crate) async fn get_by_id(&self, post_id: i64) -> Result<Vec<PostWithAuthor>, DomainError> {
        let posts: Vec<Post> = self.repo.get_post(post_id).await?.into_iter().collect();
        enrich_posts(&self.identity, posts).await
    }

    pub(crate) async fn get_comment(&self, comment_id: i64) -> Result<CommentWithAuthor, DomainError> {
        let comment = self
            .repo
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;
        enrich_comment(&self.identity, comment).await
    }

    pub(crate) async fn create(
        &self,
        actor_user_id: &str,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let (content, emoji) = req.validate()?;
        self.enforce_rate_limit(RateLimitAction::CreatePost, actor_user_id)
            .await?;

        let post = self
            .repo
            .create_post(NewPost {
                author_id: actor_user_id.to_string(),
                content,
                emoji,
            })
            .await?;

        info!(post_id = post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    pub(crate) async fn add_comment(
        &self,
        actor_user_id: &str,
        req: AddCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.enforce_rate_limit(RateLimitAction::AddComment, actor_user_id)
            .await?;

        let comment = self
            .repo
            .create_comment(NewComment {
                post_id: req.post_id,
                author_id: actor_user_id.to_string(),
                content: req.content,
            })
            .await?;

        info!(
            comment_id = comment.id,
            post_id = comment.post_id,
            author_id = %comment.author_id,
            "comment added"
        );
        Ok(comment)
    }

    pub(crate) async fn delete(
        &self,
        actor_user_id: &str,
        post_id: i64,
        claimed_author_id: &str,
    ) -> Result<DeletedPost, DomainError> {
        if let Err(err) = ensure_same_author(actor_user_id, claimed_author_id) {
            warn!(post_id, actor_user_id, claimed_author_id, "post delete rejected");
            return Err(err);
        }

        let deleted_comments = self
            .repo
            .delete_post_owned(post_id, actor_user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        info!(post_id, deleted_comments, "post deleted");
        Ok(DeletedPost {
            post_id,
            deleted_comments,
        })
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: &str,
        comment_id: i64,
        claimed_author_id: &str,
    ) -> Result<(), DomainError> {
        if let Err(err) = ensure_same_author(actor_user_id, claimed_author_id) {
            warn!(comment_id, actor_user_id, claimed_author_id, "comment delete rejected");
            return Err(err);
        }

        let deleted = self
            .repo
            .delete_comment_owned(comment_id, actor_user_id)
            .await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }

        info!(comment_id, "comment deleted");
        Ok(())
    }

    async fn enforce_rate_limit(
        &self,
        action: RateLimitAction,
        actor_user_id: &str,
    ) -> Result<(), DomainError> {
        match self.limiter.check(action, actor_user_id).await? {
            RateLimitDecision::Allow => Ok(()),
            RateLimitDecision::Deny { retry_after } => {
                warn!(%action, actor_user_id, "rate limit exceeded");
                Err(DomainError::RateLimited {
                    action,
                    retry_after_secs: retry_after.as_secs().max(1),
                })
            }
        }
    }
}
