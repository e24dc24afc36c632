use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::error::DomainError;
use crate::domain::user::IdentityUser;

pub(crate) const MAX_USER_LIST_LIMIT: usize = 100;

#[async_trait]
pub(crate) trait IdentityProvider: Send + Sync {
    /// Bulk lookup by id. At most `limit` users are returned.
    async fn get_user_list(
        &self,
        user_ids: &[String],
        limit: usize,
    ) -> Result<Vec<IdentityUser>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Vec<IdentityUser>, DomainError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<IdentityUser>, DomainError>;
    /// Replaces the whole public metadata bag; callers merge before writing.
    async fn update_public_metadata(
        &self,
        user_id: &str,
        metadata: Map<String, Value>,
    ) -> Result<IdentityUser, DomainError>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    async fn get_user_list(
        &self,
        user_ids: &[String],
        limit: usize,
    ) -> Result<Vec<IdentityUser>, DomainError> {
        (**self).get_user_list(user_ids, limit).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<IdentityUser>, DomainError> {
        (**self).find_by_username(username).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<IdentityUser>, DomainError> {
        (**self).get_user(user_id).await
    }

    async fn update_public_metadata(
        &self,
        user_id: &str,
        metadata: Map<String, Value>,
    ) -> Result<IdentityUser, DomainError> {
        (**self).update_public_metadata(user_id, metadata).await
    }
}
