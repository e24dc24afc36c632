use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::ValidateUrl;

use super::error::DomainError;

pub(crate) const MAX_DESCRIPTION_CHARS: usize = 281;
pub(crate) const MAX_BACKGROUND_URL_CHARS: usize = 2048;

pub(crate) const DESCRIPTION_KEY: &str = "description";
pub(crate) const BACKGROUND_IMG_KEY: &str = "backgroundImg";

/// User record as the identity provider returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct IdentityUser {
    pub(crate) id: String,
    pub(crate) username: Option<String>,
    pub(crate) profile_image_url: String,
    pub(crate) public_metadata: Map<String, Value>,
}

/// Client-facing projection of an identity user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct UserView {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) profile_picture: String,
    pub(crate) description: Option<String>,
    pub(crate) background_img: Option<String>,
}

impl TryFrom<IdentityUser> for UserView {
    type Error = DomainError;

    fn try_from(user: IdentityUser) -> Result<Self, Self::Error> {
        let username = user.username.ok_or_else(|| DomainError::AuthorNotFound {
            record: "user without username".to_string(),
            author_id: user.id.clone(),
        })?;

        Ok(Self {
            description: metadata_string(&user.public_metadata, DESCRIPTION_KEY),
            background_img: metadata_string(&user.public_metadata, BACKGROUND_IMG_KEY),
            id: user.id,
            username,
            profile_picture: user.profile_image_url,
        })
    }
}

/// A single metadata attribute to write into the user's bag.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MetadataUpdate {
    Description(String),
    BackgroundImg(String),
}

impl MetadataUpdate {
    pub(crate) fn description(description: String) -> Result<Self, DomainError> {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(DomainError::Validation {
                field: "description",
                message: "must be at most 281 chars",
            });
        }
        Ok(Self::Description(description))
    }

    pub(crate) fn background_img(url: String) -> Result<Self, DomainError> {
        let url = url.trim().to_string();
        let is_http = url.starts_with("https://") || url.starts_with("http://");
        if url.len() > MAX_BACKGROUND_URL_CHARS || !is_http || !url.validate_url() {
            return Err(DomainError::Validation {
                field: "background_img",
                message: "must be an http(s) url up to 2048 chars",
            });
        }
        Ok(Self::BackgroundImg(url))
    }

    fn key(&self) -> &'static str {
        match self {
            MetadataUpdate::Description(_) => DESCRIPTION_KEY,
            MetadataUpdate::BackgroundImg(_) => BACKGROUND_IMG_KEY,
        }
    }

    /// Merges this attribute into `current`, leaving every other key untouched.
    pub(crate) fn merge_into(self, mut current: Map<String, Value>) -> Map<String, Value> {
        let key = self.key();
        let value = match self {
            MetadataUpdate::Description(value) | MetadataUpdate::BackgroundImg(value) => value,
        };
        current.insert(key.to_string(), Value::String(value));
        current
    }
}

fn metadata_string(metadata: &Map<String, Value>, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::{DomainError, IdentityUser, MetadataUpdate, UserView};

    fn identity_user(username: Option<&str>, metadata: Value) -> IdentityUser {
        let public_metadata = match metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        IdentityUser {
            id: "user_1".to_string(),
            username: username.map(str::to_string),
            profile_image_url: "https://img.example.com/1.png".to_string(),
            public_metadata,
        }
    }

    #[test]
    fn user_view_projects_metadata_bag() {
        let user = identity_user(
            Some("alice"),
            json!({ "description": "hi", "backgroundImg": "https://img.example.com/bg.png", "plan": "pro" }),
        );

        let view = UserView::try_from(user).expect("must project");
        assert_eq!(view.username, "alice");
        assert_eq!(view.description.as_deref(), Some("hi"));
        assert_eq!(
            view.background_img.as_deref(),
            Some("https://img.example.com/bg.png")
        );
    }

    #[test]
    fn user_view_ignores_non_string_metadata() {
        let user = identity_user(Some("alice"), json!({ "description": 42 }));
        let view = UserView::try_from(user).expect("must project");
        assert!(view.description.is_none());
    }

    #[test]
    fn user_view_requires_username() {
        let user = identity_user(None, json!({}));
        let err = UserView::try_from(user).expect_err("must fail");
        assert!(matches!(err, DomainError::AuthorNotFound { .. }));
    }

    #[test]
    fn description_merge_preserves_background() {
        let current = identity_user(
            Some("alice"),
            json!({ "backgroundImg": "https://img.example.com/bg.png", "plan": "pro" }),
        )
        .public_metadata;

        let merged = MetadataUpdate::description("new bio".to_string())
            .expect("valid description")
            .merge_into(current);

        assert_eq!(merged["description"], json!("new bio"));
        assert_eq!(merged["backgroundImg"], json!("https://img.example.com/bg.png"));
        assert_eq!(merged["plan"], json!("pro"));
    }

    #[test]
    fn background_merge_preserves_description() {
        let current = identity_user(Some("alice"), json!({ "description": "bio" })).public_metadata;

        let merged = MetadataUpdate::background_img("https://img.example.com/new.png".to_string())
            .expect("valid url")
            .merge_into(current);

        assert_eq!(merged["description"], json!("bio"));
        assert_eq!(merged["backgroundImg"], json!("https://img.example.com/new.png"));
    }

    #[test]
    fn description_length_is_checked() {
        assert!(MetadataUpdate::description("x".repeat(281)).is_ok());
        assert!(MetadataUpdate::description(String::new()).is_ok());
        assert!(MetadataUpdate::description("x".repeat(282)).is_err());
    }

    #[test]
    fn background_img_must_be_http_url() {
        assert!(MetadataUpdate::background_img("not a url".to_string()).is_err());
        assert!(MetadataUpdate::background_img("ftp://example.com/a.png".to_string()).is_err());
        assert!(MetadataUpdate::background_img("https://example.com/a.png".to_string()).is_ok());
    }
}
