pub(crate) mod clients;
pub(crate) mod identity_provider;
pub(crate) mod post_repository;
pub(crate) mod rate_limit;
pub(crate) mod rate_limiter;
pub(crate) mod repositories;
