use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, http_handlers};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = apply_limits(
        build_router(state),
        settings.http_request_body_limit_bytes,
        Duration::from_secs(settings.http_request_timeout_secs),
        settings.http_concurrency_limit,
    );
    let app = apply_trace(app);
    let app = apply_cors(app, &settings.cors_origins)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn apply_limits(
    router: Router,
    body_limit_bytes: usize,
    request_timeout: Duration,
    concurrency_limit: usize,
) -> Router {
    router
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(GlobalConcurrencyLimitLayer::new(concurrency_limit))
}

pub(crate) fn build_router(state: AppState) -> Router {
    http_handlers::routes(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            warn!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
