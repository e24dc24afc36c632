use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::data::rate_limiter::RateLimiter;
use crate::domain::error::DomainError;
use crate::domain::rate_limit::{
    RateLimitAction, RateLimitDecision, RateLimitPolicies, RateLimitPolicy,
};

const SWEEP_THRESHOLD: usize = 10_000;

type WindowKey = (RateLimitAction, String);

/// Sliding-window log kept in process memory. Suitable for a single instance.
pub(crate) struct InMemoryRateLimiter {
    policies: RateLimitPolicies,
    windows: Mutex<HashMap<WindowKey, VecDeque<Instant>>>,
}

impl InMemoryRateLimiter {
    pub(crate) fn new(policies: RateLimitPolicies) -> Self {
        Self {
            policies,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(
        &self,
        action: RateLimitAction,
        key: &str,
    ) -> Result<RateLimitDecision, DomainError> {
        let policy = self.policies.for_action(action);
        let now = Instant::now();

        let mut windows = self
            .windows
            .lock()
            .map_err(|_| DomainError::Unexpected("rate limiter state poisoned".to_string()))?;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|(action, _), hits| {
                let window = self.policies.for_action(*action).window;
                hits.back()
                    .is_some_and(|last| now.duration_since(*last) < window)
            });
        }

        let hits = windows.entry((action, key.to_string())).or_default();
        Ok(record_hit(hits, policy, now))
    }
}

fn record_hit(hits: &mut VecDeque<Instant>, policy: RateLimitPolicy, now: Instant) -> RateLimitDecision {
    while let Some(oldest) = hits.front() {
        if now.duration_since(*oldest) >= policy.window {
            hits.pop_front();
        } else {
            break;
        }
    }

    if hits.len() < policy.max_requests as usize {
        hits.push_back(now);
        return RateLimitDecision::Allow;
    }

    let retry_after = hits
        .front()
        .map(|oldest| policy.window.saturating_sub(now.duration_since(*oldest)))
        .unwrap_or(policy.window);
    RateLimitDecision::Deny { retry_after }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::InMemoryRateLimiter;
    use crate::data::rate_limiter::RateLimiter;
    use crate::domain::rate_limit::{
        RateLimitAction, RateLimitDecision, RateLimitPolicies, RateLimitPolicy,
    };

    fn limiter() -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitPolicies {
            create_post: RateLimitPolicy::new(2, Duration::from_secs(60)),
            add_comment: RateLimitPolicy::new(1, Duration::from_secs(10)),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn denies_after_limit_and_recovers_after_window() {
        let limiter = limiter();
        let action = RateLimitAction::CreatePost;

        assert_eq!(limiter.check(action, "user_a").await.expect("check"), RateLimitDecision::Allow);
        assert_eq!(limiter.check(action, "user_a").await.expect("check"), RateLimitDecision::Allow);

        tokio::time::advance(Duration::from_secs(20)).await;
        match limiter.check(action, "user_a").await.expect("check") {
            RateLimitDecision::Deny { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(40));
            }
            RateLimitDecision::Allow => panic!("third call must be denied"),
        }

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(limiter.check(action, "user_a").await.expect("check"), RateLimitDecision::Allow);
    }

    #[tokio::test(start_paused = true)]
    async fn windows_are_independent_per_action_and_key() {
        let limiter = limiter();

        assert_eq!(
            limiter.check(RateLimitAction::AddComment, "user_a").await.expect("check"),
            RateLimitDecision::Allow
        );
        assert!(matches!(
            limiter.check(RateLimitAction::AddComment, "user_a").await.expect("check"),
            RateLimitDecision::Deny { .. }
        ));
        assert_eq!(
            limiter.check(RateLimitAction::AddComment, "user_b").await.expect("check"),
            RateLimitDecision::Allow
        );
        assert_eq!(
            limiter.check(RateLimitAction::CreatePost, "user_a").await.expect("check"),
            RateLimitDecision::Allow
        );
    }

    #[tokio::test(start_paused = true)]
    async fn denied_attempts_do_not_extend_the_window() {
        let limiter = limiter();
        let action = RateLimitAction::AddComment;

        assert_eq!(limiter.check(action, "user_a").await.expect("check"), RateLimitDecision::Allow);
        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(1)).await;
            assert!(matches!(
                limiter.check(action, "user_a").await.expect("check"),
                RateLimitDecision::Deny { .. }
            ));
        }

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(limiter.check(action, "user_a").await.expect("check"), RateLimitDecision::Allow);
    }
}
