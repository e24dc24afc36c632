use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::UserView;
use crate::presentation::AppState;
use crate::presentation::app_error::{AppResult, ErrorBody};
use crate::presentation::extract::{ApiJson, ApiPath};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateDescriptionDto {
    #[validate(length(max = 281))]
    pub(crate) description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateBackgroundDto {
    #[validate(url, length(max = 2048))]
    pub(crate) background_img: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) profile_picture: String,
    pub(crate) description: Option<String>,
    pub(crate) background_img: Option<String>,
}

impl From<UserView> for UserDto {
    fn from(user: UserView) -> Self {
        Self {
            id: user.id,
            username: user.username,
            profile_picture: user.profile_picture,
            description: user.description,
            background_img: user.background_img,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/by-username/{username}",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Exact username")
    ),
    responses(
        (status = 200, description = "Profile found", body = UserDto),
        (status = 404, description = "No user with this username", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn get_profile_by_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.profile_service.get_by_username(&username).await?;
    Ok((StatusCode::OK, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{user_id}",
    tag = "profile",
    params(
        ("user_id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Profile found", body = UserDto),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.profile_service.get_by_id(&user_id).await?;
    Ok((StatusCode::OK, Json(user.into())))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{user_id}/description",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("user_id" = String, Path, description = "User id; must be the session user")
    ),
    request_body = UpdateDescriptionDto,
    responses(
        (status = 200, description = "Description updated", body = UserDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Not the session user", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn update_description(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(user_id): ApiPath<String>,
    ApiJson(dto): ApiJson<UpdateDescriptionDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;
    let user = state
        .profile_service
        .update_description(&auth.user_id, &user_id, dto.description)
        .await?;
    Ok((StatusCode::OK, Json(user.into())))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{user_id}/background",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("user_id" = String, Path, description = "User id; must be the session user")
    ),
    request_body = UpdateBackgroundDto,
    responses(
        (status = 200, description = "Background updated", body = UserDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Not the session user", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn update_background(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(user_id): ApiPath<String>,
    ApiJson(dto): ApiJson<UpdateBackgroundDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;
    let user = state
        .profile_service
        .update_background(&auth.user_id, &user_id, dto.background_img)
        .await?;
    Ok((StatusCode::OK, Json(user.into())))
}
