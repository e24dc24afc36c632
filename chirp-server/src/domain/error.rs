use thiserror::Error;

use super::rate_limit::RateLimitAction;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    /// Caller is authenticated but does not own the target resource.
    #[error("unauthorized")]
    Unauthorized,

    #[error("rate limit exceeded for {action}, retry in {retry_after_secs}s")]
    RateLimited {
        action: RateLimitAction,
        retry_after_secs: u64,
    },

    /// A stored record references an author the identity provider does not know.
    #[error("author not found for {record} (author id: {author_id})")]
    AuthorNotFound { record: String, author_id: String },

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
