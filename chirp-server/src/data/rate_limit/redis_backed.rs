use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use redis::Script;
use redis::aio::ConnectionManager;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::data::rate_limiter::RateLimiter;
use crate::domain::error::DomainError;
use crate::domain::rate_limit::{RateLimitAction, RateLimitDecision, RateLimitPolicies};

/// Trims the window, counts it and records the attempt only when allowed.
/// Returns `{allowed, retry_after_ms}`.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
local member = ARGV[4]

redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
local count = redis.call('ZCARD', key)
if count < limit then
  redis.call('ZADD', key, now, member)
  redis.call('PEXPIRE', key, window)
  return {1, 0}
end

local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
local retry = window
if oldest[2] then
  retry = tonumber(oldest[2]) + window - now
end
return {0, retry}
"#;

const REDIS_TIMEOUT: Duration = Duration::from_millis(250);

/// Sliding-window limiter shared by every server instance through Redis.
pub(crate) struct RedisRateLimiter {
    conn: ConnectionManager,
    policies: RateLimitPolicies,
    script: Script,
    seq: AtomicU64,
}

impl RedisRateLimiter {
    pub(crate) async fn connect(
        redis_url: &str,
        policies: RateLimitPolicies,
    ) -> anyhow::Result<Self> {
        let client =
            redis::Client::open(redis_url).context("failed to parse REDIS_URL connection string")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("failed to connect to Redis")?;

        info!("rate limiter connected to Redis");
        Ok(Self {
            conn,
            policies,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
            seq: AtomicU64::new(0),
        })
    }

    fn member(&self, now_ms: i64) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{now_ms}-{}-{seq}", std::process::id())
    }
}

pub(crate) fn window_key(action: RateLimitAction, key: &str) -> String {
    format!("ratelimit:{}:{key}", action.as_str())
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(
        &self,
        action: RateLimitAction,
        key: &str,
    ) -> Result<RateLimitDecision, DomainError> {
        let policy = self.policies.for_action(action);
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = i64::try_from(policy.window.as_millis()).unwrap_or(i64::MAX);

        let mut conn = self.conn.clone();
        let mut invocation = self.script.key(window_key(action, key));
        invocation
            .arg(now_ms)
            .arg(window_ms)
            .arg(policy.max_requests)
            .arg(self.member(now_ms));

        let result = timeout(
            REDIS_TIMEOUT,
            invocation.invoke_async::<_, (i64, i64)>(&mut conn),
        )
        .await;

        // Fail closed: a limiter outage must not let writes through.
        let (allowed, retry_after_ms) = match result {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                warn!(error = %err, %action, "rate limit Redis error");
                return Err(DomainError::Unexpected(format!("rate limiter: {err}")));
            }
            Err(_) => {
                warn!(%action, "rate limit Redis timeout");
                return Err(DomainError::Unexpected("rate limiter timeout".to_string()));
            }
        };

        if allowed == 1 {
            return Ok(RateLimitDecision::Allow);
        }
        let retry_after = Duration::from_millis(u64::try_from(retry_after_ms).unwrap_or(0));
        Ok(RateLimitDecision::Deny { retry_after })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RedisRateLimiter, window_key};
    use crate::data::rate_limiter::RateLimiter;
    use crate::domain::rate_limit::{
        RateLimitAction, RateLimitDecision, RateLimitPolicies, RateLimitPolicy,
    };

    #[test]
    fn window_keys_are_namespaced_per_action() {
        assert_eq!(
            window_key(RateLimitAction::CreatePost, "user_1"),
            "ratelimit:post:user_1"
        );
        assert_eq!(
            window_key(RateLimitAction::AddComment, "user_1"),
            "ratelimit:comment:user_1"
        );
    }

    #[tokio::test]
    #[ignore = "requires running Redis (REDIS_URL)"]
    async fn redis_limiter_denies_over_limit() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        let limiter = RedisRateLimiter::connect(
            &url,
            RateLimitPolicies {
                create_post: RateLimitPolicy::new(1, Duration::from_secs(30)),
                add_comment: RateLimitPolicy::new(1, Duration::from_secs(30)),
            },
        )
        .await
        .expect("redis must be reachable");

        let key = format!("test-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));
        assert_eq!(
            limiter.check(RateLimitAction::CreatePost, &key).await.expect("check"),
            RateLimitDecision::Allow
        );
        assert!(matches!(
            limiter.check(RateLimitAction::CreatePost, &key).await.expect("check"),
            RateLimitDecision::Deny { .. }
        ));
    }
}
