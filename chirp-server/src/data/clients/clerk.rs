use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::data::identity_provider::IdentityProvider;
use crate::domain::error::DomainError;
use crate::domain::user::IdentityUser;

/// Identity provider backed by the Clerk Backend API.
#[derive(Debug, Clone)]
pub(crate) struct ClerkIdentityProvider {
    base_url: String,
    secret_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ClerkUserDto {
    id: String,
    username: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
    #[serde(default)]
    public_metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct UpdateMetadataDto<'a> {
    public_metadata: &'a Map<String, Value>,
}

impl From<ClerkUserDto> for IdentityUser {
    fn from(dto: ClerkUserDto) -> Self {
        Self {
            id: dto.id,
            username: dto.username,
            profile_image_url: dto
                .image_url
                .or(dto.profile_image_url)
                .unwrap_or_default(),
            public_metadata: dto.public_metadata,
        }
    }
}

impl ClerkIdentityProvider {
    pub(crate) fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .bearer_auth(&self.secret_key)
    }

    /// `/users/{id}` with the id pushed as a single encoded path segment.
    fn user_url(&self, user_id: &str) -> Result<Url, DomainError> {
        let mut url = Url::parse(&self.endpoint("/users"))
            .map_err(|err| DomainError::Unexpected(format!("identity provider url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| DomainError::Unexpected("identity provider url has no path".to_string()))?
            .push(user_id);
        Ok(url)
    }

    fn user_request(&self, method: Method, user_id: &str) -> Result<RequestBuilder, DomainError> {
        let url = self.user_url(user_id)?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.secret_key))
    }

    async fn send_users(&self, request: RequestBuilder) -> Result<Vec<IdentityUser>, DomainError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let response = ensure_success(response).await?;
        let users = response
            .json::<Vec<ClerkUserDto>>()
            .await
            .map_err(map_transport_error)?;
        Ok(users.into_iter().map(IdentityUser::from).collect())
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentityProvider {
    async fn get_user_list(
        &self,
        user_ids: &[String],
        limit: usize,
    ) -> Result<Vec<IdentityUser>, DomainError> {
        // An unfiltered list call would return every user.
        if user_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut query: Vec<(&str, String)> = user_ids
            .iter()
            .take(limit)
            .map(|id| ("user_id", id.clone()))
            .collect();
        query.push(("limit", limit.to_string()));

        self.send_users(self.request(Method::GET, "/users").query(&query))
            .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<IdentityUser>, DomainError> {
        let query = [("username", username)];
        self.send_users(self.request(Method::GET, "/users").query(&query))
            .await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<IdentityUser>, DomainError> {
        if !is_user_id(user_id) {
            warn!(user_id, "rejected malformed user id");
            return Ok(None);
        }

        let response = self
            .user_request(Method::GET, user_id)?
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let user = response
            .json::<ClerkUserDto>()
            .await
            .map_err(map_transport_error)?;
        Ok(Some(user.into()))
    }

    async fn update_public_metadata(
        &self,
        user_id: &str,
        metadata: Map<String, Value>,
    ) -> Result<IdentityUser, DomainError> {
        if !is_user_id(user_id) {
            warn!(user_id, "rejected malformed user id");
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }

        let payload = UpdateMetadataDto {
            public_metadata: &metadata,
        };
        let response = self
            .user_request(Method::PATCH, user_id)?
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        let response = ensure_success(response).await?;
        let user = response
            .json::<ClerkUserDto>()
            .await
            .map_err(map_transport_error)?;
        Ok(user.into())
    }
}

/// Provider ids look like `user_2abcXYZ`.
fn is_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(%status, body = %body, "identity provider request failed");
    Err(DomainError::Unexpected(format!(
        "identity provider returned {status}"
    )))
}

fn map_transport_error(err: reqwest::Error) -> DomainError {
    warn!(error = %err, "identity provider transport error");
    DomainError::Unexpected(format!("identity provider: {err}"))
}
