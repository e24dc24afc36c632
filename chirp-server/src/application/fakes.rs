//! In-memory doubles for the data traits, shared by service and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Map, Value};

use crate::data::identity_provider::IdentityProvider;
use crate::data::post_repository::{NewComment, NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post};
use crate::domain::user::IdentityUser;

#[derive(Default)]
struct StoreState {
    next_id: i64,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    writes: usize,
}

/// Mirrors the Postgres repository contract.
#[derive(Clone, Default)]
pub(crate) struct FakePostRepo {
    state: Arc<Mutex<StoreState>>,
}

impl FakePostRepo {
    pub(crate) fn writes(&self) -> usize {
        self.state.lock().expect("store mutex poisoned").writes
    }

    fn with_comments(state: &StoreState, post: &Post) -> Post {
        let comments = state
            .comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .cloned()
            .collect();
        post.clone().with_comments(comments)
    }
}

#[async_trait]
impl PostRepository for FakePostRepo {
    async fn list_recent(&self, limit: i64) -> Result<Vec<Post>, DomainError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .map(|p| Self::with_comments(&state, p))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(posts)
    }

    async fn list_by_author(&self, author_id: &str, limit: i64) -> Result<Vec<Post>, DomainError> {
        let posts = self.list_recent(i64::MAX).await?;
        Ok(posts
            .into_iter()
            .filter(|p| p.author_id == author_id)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| Self::with_comments(&state, p)))
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.next_id += 1;
        state.writes += 1;
        // Strictly increasing timestamps keep ordering deterministic.
        let created_at = Utc::now() + ChronoDuration::milliseconds(state.next_id);
        let post = Post::new(
            state.next_id,
            input.author_id,
            input.content,
            input.emoji,
            created_at,
        )?;
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.posts.iter().any(|p| p.id == input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        state.next_id += 1;
        state.writes += 1;
        let comment = Comment::new(
            state.next_id,
            input.post_id,
            input.author_id,
            input.content,
            Utc::now() + ChronoDuration::milliseconds(state.next_id),
        )?;
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_post_owned(
        &self,
        post_id: i64,
        owner_id: &str,
    ) -> Result<Option<u64>, DomainError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state
            .posts
            .iter()
            .any(|p| p.id == post_id && p.author_id == owner_id)
        {
            return Ok(None);
        }
        state.writes += 1;
        let before = state.comments.len();
        state.comments.retain(|c| c.post_id != post_id);
        let removed = (before - state.comments.len()) as u64;
        state.posts.retain(|p| p.id != post_id);
        Ok(Some(removed))
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: &str,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let before = state.comments.len();
        state
            .comments
            .retain(|c| !(c.id == comment_id && c.author_id == owner_id));
        let deleted = state.comments.len() < before;
        if deleted {
            state.writes += 1;
        }
        Ok(deleted)
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeIdentity {
    users: Arc<Mutex<HashMap<String, IdentityUser>>>,
    metadata_writes: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
}

impl FakeIdentity {
    pub(crate) fn with_users(ids: &[&str]) -> Self {
        let identity = Self::default();
        for id in ids {
            identity.insert(id, &format!("name_{id}"), Map::new());
        }
        identity
    }

    pub(crate) fn insert(&self, id: &str, username: &str, public_metadata: Map<String, Value>) {
        self.users.lock().expect("users mutex poisoned").insert(
            id.to_string(),
            IdentityUser {
                id: id.to_string(),
                username: Some(username.to_string()),
                profile_image_url: format!("https://img.example.com/{id}.png"),
                public_metadata,
            },
        );
    }

    pub(crate) fn remove(&self, id: &str) {
        self.users.lock().expect("users mutex poisoned").remove(id);
    }

    pub(crate) fn metadata_writes(&self) -> Vec<(String, Map<String, Value>)> {
        self.metadata_writes
            .lock()
            .expect("writes mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_user_list(
        &self,
        user_ids: &[String],
        limit: usize,
    ) -> Result<Vec<IdentityUser>, DomainError> {
        let users = self.users.lock().expect("users mutex poisoned");
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .take(limit)
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<IdentityUser>, DomainError> {
        let users = self.users.lock().expect("users mutex poisoned");
        Ok(users
            .values()
            .filter(|u| u.username.as_deref() == Some(username))
            .cloned()
            .collect())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<IdentityUser>, DomainError> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .get(user_id)
            .cloned())
    }

    async fn update_public_metadata(
        &self,
        user_id: &str,
        metadata: Map<String, Value>,
    ) -> Result<IdentityUser, DomainError> {
        self.metadata_writes
            .lock()
            .expect("writes mutex poisoned")
            .push((user_id.to_string(), metadata.clone()));

        let mut users = self.users.lock().expect("users mutex poisoned");
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        user.public_metadata = metadata;
        Ok(user.clone())
    }
}
