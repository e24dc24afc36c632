use tracing::{info, warn};

use crate::data::identity_provider::IdentityProvider;
use crate::domain::error::DomainError;
use crate::domain::post::ensure_same_author;
use crate::domain::user::{MetadataUpdate, UserView};

pub(crate) struct ProfileService<I: IdentityProvider> {
    identity: I,
}

impl<I: IdentityProvider> ProfileService<I> {
    pub(crate) fn new(identity: I) -> Self {
        Self { identity }
    }

    pub(crate) async fn get_by_username(&self, username: &str) -> Result<UserView, DomainError> {
        let user = self
            .identity
            .find_by_username(username)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("username: {username}")))?;
        UserView::try_from(user)
    }

    pub(crate) async fn get_by_id(&self, user_id: &str) -> Result<UserView, DomainError> {
        let user = self
            .identity
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        UserView::try_from(user)
    }

    pub(crate) async fn update_description(
        &self,
        actor_user_id: &str,
        user_id: &str,
        description: String,
    ) -> Result<UserView, DomainError> {
        self.ensure_owner(actor_user_id, user_id)?;
        let update = MetadataUpdate::description(description)?;
        self.write_metadata(user_id, update).await
    }

    pub(crate) async fn update_background(
        &self,
        actor_user_id: &str,
        user_id: &str,
        background_img: String,
    ) -> Result<UserView, DomainError> {
        self.ensure_owner(actor_user_id, user_id)?;
        let update = MetadataUpdate::background_img(background_img)?;
        self.write_metadata(user_id, update).await
    }

    fn ensure_owner(&self, actor_user_id: &str, user_id: &str) -> Result<(), DomainError> {
        ensure_same_author(actor_user_id, user_id).inspect_err(|_| {
            warn!(actor_user_id, user_id, "profile update rejected");
        })
    }

    // Read-modify-write: the provider replaces the whole bag on update.
    async fn write_metadata(
        &self,
        user_id: &str,
        update: MetadataUpdate,
    ) -> Result<UserView, DomainError> {
        let current = self
            .identity
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;

        let merged = update.merge_into(current.public_metadata);
        let updated = self.identity.update_public_metadata(user_id, merged).await?;

        info!(user_id, "profile metadata updated");
        UserView::try_from(updated)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::ProfileService;
    use crate::application::fakes::FakeIdentity;
    use crate::domain::error::DomainError;

    fn identity_with(id: &str, username: &str, metadata: Value) -> FakeIdentity {
        let public_metadata = match metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let identity = FakeIdentity::default();
        identity.insert(id, username, public_metadata);
        identity
    }

    #[tokio::test]
    async fn get_by_username_projects_first_match() {
        let identity = identity_with("user_1", "alice", json!({ "description": "bio" }));
        let service = ProfileService::new(identity);

        let view = service
            .get_by_username("alice")
            .await
            .expect("lookup must succeed");
        assert_eq!(view.id, "user_1");
        assert_eq!(view.description.as_deref(), Some("bio"));
        assert!(view.background_img.is_none());
    }

    #[tokio::test]
    async fn get_by_username_without_match_is_not_found() {
        let service = ProfileService::new(FakeIdentity::default());
        let err = service
            .get_by_username("nobody")
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_by_id_missing_is_not_found() {
        let service = ProfileService::new(FakeIdentity::default());
        let err = service.get_by_id("user_x").await.expect_err("must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_description_preserves_background() {
        let identity = identity_with(
            "user_1",
            "alice",
            json!({ "backgroundImg": "https://img.example.com/bg.png" }),
        );
        let service = ProfileService::new(identity.clone());

        let view = service
            .update_description("user_1", "user_1", "new bio".to_string())
            .await
            .expect("update must succeed");

        assert_eq!(view.description.as_deref(), Some("new bio"));
        assert_eq!(
            view.background_img.as_deref(),
            Some("https://img.example.com/bg.png")
        );

        let writes = identity.metadata_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1["backgroundImg"], json!("https://img.example.com/bg.png"));
    }

    #[tokio::test]
    async fn update_background_preserves_description() {
        let identity = identity_with("user_1", "alice", json!({ "description": "bio" }));
        let service = ProfileService::new(identity);

        let view = service
            .update_background("user_1", "user_1", " https://img.example.com/new.png ".to_string())
            .await
            .expect("update must succeed");

        assert_eq!(view.description.as_deref(), Some("bio"));
        assert_eq!(
            view.background_img.as_deref(),
            Some("https://img.example.com/new.png")
        );
    }

    #[tokio::test]
    async fn update_for_other_user_is_unauthorized_without_writes() {
        let identity = identity_with("user_1", "alice", json!({}));
        let service = ProfileService::new(identity.clone());

        let err = service
            .update_description("user_2", "user_1", "hijack".to_string())
            .await
            .expect_err("must be rejected");
        assert!(matches!(err, DomainError::Unauthorized));

        let err = service
            .update_background("user_2", "user_1", "https://img.example.com/x.png".to_string())
            .await
            .expect_err("must be rejected");
        assert!(matches!(err, DomainError::Unauthorized));

        assert!(identity.metadata_writes().is_empty());
    }

    #[tokio::test]
    async fn invalid_values_are_rejected_before_writing() {
        let identity = identity_with("user_1", "alice", json!({}));
        let service = ProfileService::new(identity.clone());

        let err = service
            .update_description("user_1", "user_1", "x".repeat(282))
            .await
            .expect_err("must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "description", .. }));

        let err = service
            .update_background("user_1", "user_1", "javascript:alert(1)".to_string())
            .await
            .expect_err("must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "background_img", .. }));

        assert!(identity.metadata_writes().is_empty());
    }

    #[tokio::test]
    async fn update_for_missing_user_is_not_found() {
        let service = ProfileService::new(FakeIdentity::default());
        let err = service
            .update_description("user_9", "user_9", "bio".to_string())
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
