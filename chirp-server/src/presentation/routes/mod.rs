use axum::Router;

use super::AppState;

pub(crate) mod posts;
pub(crate) mod profile;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api", posts::router(state.clone()))
        .nest("/api/profiles", profile::router(state))
}
