use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RateLimitAction {
    CreatePost,
    AddComment,
}

impl RateLimitAction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            RateLimitAction::CreatePost => "post",
            RateLimitAction::AddComment => "comment",
        }
    }
}

impl fmt::Display for RateLimitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// At most `max_requests` actions per rolling `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RateLimitPolicy {
    pub(crate) max_requests: u32,
    pub(crate) window: Duration,
}

impl RateLimitPolicy {
    pub(crate) fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RateLimitPolicies {
    pub(crate) create_post: RateLimitPolicy,
    pub(crate) add_comment: RateLimitPolicy,
}

impl RateLimitPolicies {
    pub(crate) fn for_action(&self, action: RateLimitAction) -> RateLimitPolicy {
        match action {
            RateLimitAction::CreatePost => self.create_post,
            RateLimitAction::AddComment => self.add_comment,
        }
    }
}

impl Default for RateLimitPolicies {
    fn default() -> Self {
        Self {
            create_post: RateLimitPolicy::new(3, Duration::from_secs(60)),
            add_comment: RateLimitPolicy::new(1, Duration::from_secs(10)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RateLimitDecision {
    Allow,
    Deny { retry_after: Duration },
}
