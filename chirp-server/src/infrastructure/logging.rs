use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Noisy dependencies are capped at `warn` unless RUST_LOG says otherwise.
const DEPENDENCY_DIRECTIVES: &[&str] = &["sqlx=warn", "hyper=warn", "reqwest=warn"];

pub(crate) fn init_logging(default_level: &str) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(default_level))
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn build_filter(default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directives = std::iter::once(default_level)
        .chain(DEPENDENCY_DIRECTIVES.iter().copied())
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

