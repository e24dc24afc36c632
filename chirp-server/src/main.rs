use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::posts_service::PostsService;
use application::profile_service::ProfileService;
use data::clients::clerk::ClerkIdentityProvider;
use data::rate_limit::in_memory::InMemoryRateLimiter;
use data::rate_limit::redis_backed::RedisRateLimiter;
use data::rate_limiter::RateLimiter;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::{AppState, DynIdentityProvider, DynPostRepository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let identity: DynIdentityProvider = Arc::new(
        ClerkIdentityProvider::new(
            settings.identity_api_url.clone(),
            settings.identity_api_key.clone(),
            Duration::from_secs(settings.identity_timeout_secs),
        )
        .context("failed to build identity provider client")?,
    );

    let limiter: Arc<dyn RateLimiter> = match &settings.redis_url {
        Some(url) => Arc::new(RedisRateLimiter::connect(url, settings.rate_limits).await?),
        None => {
            info!("REDIS_URL not set, using in-process rate limiter");
            Arc::new(InMemoryRateLimiter::new(settings.rate_limits))
        }
    };

    let repo: DynPostRepository = Arc::new(PostgresPostRepository::new(pool));
    let posts_service = Arc::new(PostsService::new(repo, identity.clone(), limiter));
    let profile_service = Arc::new(ProfileService::new(identity));
    let jwt = Arc::new(JwtService::new(&settings.jwt).context("failed to load JWT key")?);

    let state = AppState::new(posts_service, profile_service, jwt);
    server::run_http(&settings, state).await
}
