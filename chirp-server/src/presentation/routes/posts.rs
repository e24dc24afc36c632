use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    add_comment, create_post, delete_comment, delete_post, get_comment, get_post, list_posts,
    list_user_posts,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{post_id}", get(get_post))
        .route("/users/{user_id}/posts", get(list_user_posts))
        .route("/comments/{comment_id}", get(get_comment));

    let protected = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{post_id}", delete(delete_post))
        .route("/posts/{post_id}/comments", post(add_comment))
        .route("/comments/{comment_id}", delete(delete_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
