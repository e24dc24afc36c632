use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::posts_service::DeletedPost;
use crate::domain::post::{AddCommentRequest, Comment, CreatePostRequest, Post};
use crate::domain::view::{CommentWithAuthor, PostWithAuthor};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppResult, ErrorBody};
use crate::presentation::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::handlers::profile::UserDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 280))]
    pub(crate) content: String,
    /// Exactly one emoji glyph; the placeholder is used when omitted.
    pub(crate) emoji: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct AddCommentDto {
    #[validate(length(min = 1, max = 280))]
    pub(crate) content: String,
}

/// Claimed owner of the resource; must match the session user.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct AuthorQuery {
    #[validate(length(min = 1))]
    pub(crate) author_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) emoji: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentWithAuthorDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) comment_author: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct EnrichedPostDto {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) emoji: String,
    pub(crate) created_at: DateTime<Utc>,
    /// Newest first.
    pub(crate) comments: Vec<CommentWithAuthorDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostWithAuthorDto {
    pub(crate) post: EnrichedPostDto,
    pub(crate) author: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DeletePostResponseDto {
    pub(crate) post_id: i64,
    pub(crate) deleted_comments: u64,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            emoji: post.emoji,
            created_at: post.created_at,
        }
    }
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

impl From<CommentWithAuthor> for CommentWithAuthorDto {
    fn from(value: CommentWithAuthor) -> Self {
        let comment = value.comment;
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: comment.created_at,
            comment_author: value.comment_author.into(),
        }
    }
}

impl From<PostWithAuthor> for PostWithAuthorDto {
    fn from(value: PostWithAuthor) -> Self {
        let post = value.post;
        Self {
            post: EnrichedPostDto {
                id: post.id,
                author_id: post.author_id,
                content: post.content,
                emoji: post.emoji,
                created_at: post.created_at,
                comments: post
                    .comments
                    .into_iter()
                    .map(CommentWithAuthorDto::from)
                    .collect(),
            },
            author: value.author.into(),
        }
    }
}

impl From<DeletedPost> for DeletePostResponseDto {
    fn from(value: DeletedPost) -> Self {
        Self {
            post_id: value.post_id,
            deleted_comments: value.deleted_comments,
        }
    }
}

fn to_dtos(posts: Vec<PostWithAuthor>) -> Vec<PostWithAuthorDto> {
    posts.into_iter().map(PostWithAuthorDto::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "Up to 100 most recent posts, newest first", body = [PostWithAuthorDto]),
        (status = 500, description = "Internal or consistency error", body = ErrorBody)
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<PostWithAuthorDto>>)> {
    let posts = state.posts_service.list_all().await?;
    Ok((StatusCode::OK, Json(to_dtos(posts))))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/posts",
    tag = "posts",
    params(
        ("user_id" = String, Path, description = "Author id")
    ),
    responses(
        (status = 200, description = "Posts by the author, newest first", body = [PostWithAuthorDto]),
        (status = 500, description = "Internal or consistency error", body = ErrorBody)
    )
)]
pub(crate) async fn list_user_posts(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> AppResult<(StatusCode, Json<Vec<PostWithAuthorDto>>)> {
    let posts = state.posts_service.list_by_author(&user_id).await?;
    Ok((StatusCode::OK, Json(to_dtos(posts))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    tag = "posts",
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Zero or one post", body = [PostWithAuthorDto]),
        (status = 500, description = "Internal or consistency error", body = ErrorBody)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> AppResult<(StatusCode, Json<Vec<PostWithAuthorDto>>)> {
    let posts = state.posts_service.get_by_id(post_id).await?;
    Ok((StatusCode::OK, Json(to_dtos(posts))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 429, description = "Rate limited", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        content: dto.content,
        emoji: dto.emoji,
    };

    let post = state.posts_service.create(&auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/comments",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    request_body = AddCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 429, description = "Rate limited", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(post_id): ApiPath<i64>,
    ApiJson(dto): ApiJson<AddCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;
    let req = AddCommentRequest {
        post_id,
        content: dto.content,
    };

    let comment = state.posts_service.add_comment(&auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(CommentDto::from(comment))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id"),
        AuthorQuery
    ),
    responses(
        (status = 200, description = "Post and its comments deleted", body = DeletePostResponseDto),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Claimed author is not the session user", body = ErrorBody),
        (status = 404, description = "No such post owned by the caller", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(post_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<AuthorQuery>,
) -> AppResult<(StatusCode, Json<DeletePostResponseDto>)> {
    query.validate()?;
    let deleted = state
        .posts_service
        .delete(&auth.user_id, post_id, &query.author_id)
        .await?;
    Ok((StatusCode::OK, Json(deleted.into())))
}

#[utoipa::path(
    get,
    path = "/api/comments/{comment_id}",
    tag = "posts",
    params(
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment found", body = CommentWithAuthorDto),
        (status = 404, description = "Comment not found", body = ErrorBody),
        (status = 500, description = "Internal or consistency error", body = ErrorBody)
    )
)]
pub(crate) async fn get_comment(
    State(state): State<AppState>,
    ApiPath(comment_id): ApiPath<i64>,
) -> AppResult<(StatusCode, Json<CommentWithAuthorDto>)> {
    let comment = state.posts_service.get_comment(comment_id).await?;
    Ok((StatusCode::OK, Json(comment.into())))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{comment_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("comment_id" = i64, Path, description = "Comment id"),
        AuthorQuery
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Claimed author is not the session user", body = ErrorBody),
        (status = 404, description = "No such comment owned by the caller", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(comment_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<AuthorQuery>,
) -> AppResult<StatusCode> {
    query.validate()?;
    state
        .posts_service
        .delete_comment(&auth.user_id, comment_id, &query.author_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
