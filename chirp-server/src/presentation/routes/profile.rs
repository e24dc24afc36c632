use axum::Router;
use axum::middleware;
use axum::routing::{get, put};

use crate::presentation::AppState;
use crate::presentation::handlers::profile::{
    get_profile, get_profile_by_username, update_background, update_description,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/by-username/{username}", get(get_profile_by_username))
        .route("/{user_id}", get(get_profile));

    let protected = Router::new()
        .route("/{user_id}/description", put(update_description))
        .route("/{user_id}/background", put(update_background))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
