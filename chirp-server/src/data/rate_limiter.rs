use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::rate_limit::{RateLimitAction, RateLimitDecision};

#[async_trait]
pub(crate) trait RateLimiter: Send + Sync {
    /// Records an attempt for `key` under `action` when it is allowed.
    async fn check(
        &self,
        action: RateLimitAction,
        key: &str,
    ) -> Result<RateLimitDecision, DomainError>;
}
