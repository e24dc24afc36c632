use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::domain::rate_limit::{RateLimitPolicies, RateLimitPolicy};

/// Key material for verifying session tokens.
#[derive(Debug, Clone)]
pub enum JwtVerification {
    /// PEM-encoded RSA public key of the identity provider (RS256).
    RsaPublicKey(String),
    /// Shared secret (HS256).
    Secret(String),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    pub jwt: JwtVerification,
    pub identity_api_url: String,
    pub identity_api_key: String,
    pub identity_timeout_secs: u64,
    pub redis_url: Option<String>,
    pub rate_limits: RateLimitPolicies,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_max_connections = parse_u32_env("DATABASE_MAX_CONNECTIONS", 10)?;

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 64 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 10)?;

        let jwt = jwt_verification_from_env()?;

        let identity_api_url = std::env::var("IDENTITY_API_URL")
            .unwrap_or_else(|_| "https://api.clerk.com/v1".to_string());
        let identity_api_key =
            get_required("IDENTITY_API_KEY").context("IDENTITY_API_KEY is required")?;
        let identity_timeout_secs = parse_u64_env("IDENTITY_TIMEOUT_SECS", 5)?;

        let redis_url = get_optional("REDIS_URL");

        let defaults = RateLimitPolicies::default();
        let rate_limits = RateLimitPolicies {
            create_post: parse_policy("RATE_LIMIT_POST", defaults.create_post)?,
            add_comment: parse_policy("RATE_LIMIT_COMMENT", defaults.add_comment)?,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            jwt,
            identity_api_url,
            identity_api_key,
            identity_timeout_secs,
            redis_url,
            rate_limits,
        })
    }
}

fn jwt_verification_from_env() -> Result<JwtVerification> {
    if let Some(pem) = get_optional("AUTH_JWT_PUBLIC_KEY") {
        // Env files often carry the PEM on one line with escaped newlines.
        return Ok(JwtVerification::RsaPublicKey(pem.replace("\\n", "\n")));
    }

    let secret = get_optional("JWT_SECRET")
        .ok_or_else(|| anyhow!("either AUTH_JWT_PUBLIC_KEY or JWT_SECRET is required"))?;
    if secret.chars().count() < 32 {
        return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
    }
    Ok(JwtVerification::Secret(secret))
}

fn parse_policy(prefix: &str, default: RateLimitPolicy) -> Result<RateLimitPolicy> {
    let max_requests = parse_u32_env(&format!("{prefix}_MAX"), default.max_requests)?;
    let window_secs = parse_u64_env(&format!("{prefix}_WINDOW_SECS"), default.window.as_secs())?;
    Ok(RateLimitPolicy::new(
        max_requests,
        Duration::from_secs(window_secs),
    ))
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn get_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
