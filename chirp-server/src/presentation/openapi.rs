use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::app_error::ErrorBody;
use crate::presentation::handlers::posts::{
    AddCommentDto, CommentDto, CommentWithAuthorDto, CreatePostDto, DeletePostResponseDto,
    EnrichedPostDto, PostDto, PostWithAuthorDto,
};
use crate::presentation::handlers::profile::{UpdateBackgroundDto, UpdateDescriptionDto, UserDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::list_user_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::add_comment,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::get_comment,
        crate::presentation::handlers::posts::delete_comment,
        crate::presentation::handlers::profile::get_profile_by_username,
        crate::presentation::handlers::profile::get_profile,
        crate::presentation::handlers::profile::update_description,
        crate::presentation::handlers::profile::update_background
    ),
    components(
        schemas(
            CreatePostDto,
            AddCommentDto,
            PostDto,
            CommentDto,
            CommentWithAuthorDto,
            EnrichedPostDto,
            PostWithAuthorDto,
            DeletePostResponseDto,
            UpdateDescriptionDto,
            UpdateBackgroundDto,
            UserDto,
            ErrorBody
        )
    ),
    tags(
        (name = "posts", description = "Posts and comments"),
        (name = "profile", description = "User profiles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/posts",
            "/api/posts/{post_id}",
            "/api/posts/{post_id}/comments",
            "/api/users/{user_id}/posts",
            "/api/comments/{comment_id}",
            "/api/profiles/by-username/{username}",
            "/api/profiles/{user_id}",
            "/api/profiles/{user_id}/description",
            "/api/profiles/{user_id}/background",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
