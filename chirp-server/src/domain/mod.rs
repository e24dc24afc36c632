pub(crate) mod emoji;
pub(crate) mod error;
pub(crate) mod post;
pub(crate) mod rate_limit;
pub(crate) mod user;
pub(crate) mod view;
