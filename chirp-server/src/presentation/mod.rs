use std::sync::Arc;

use crate::application::posts_service::PostsService;
use crate::application::profile_service::ProfileService;
use crate::data::identity_provider::IdentityProvider;
use crate::data::post_repository::PostRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod extract;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type DynPostRepository = Arc<dyn PostRepository>;
pub(crate) type DynIdentityProvider = Arc<dyn IdentityProvider>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) posts_service: Arc<PostsService<DynPostRepository, DynIdentityProvider>>,
    pub(crate) profile_service: Arc<ProfileService<DynIdentityProvider>>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        posts_service: Arc<PostsService<DynPostRepository, DynIdentityProvider>>,
        profile_service: Arc<ProfileService<DynIdentityProvider>>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            posts_service,
            profile_service,
            jwt,
        }
    }
}
