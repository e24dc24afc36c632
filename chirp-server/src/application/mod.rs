pub(crate) mod author_enrichment;
pub(crate) mod posts_service;
pub(crate) mod profile_service;

#[cfg(test)]
pub(crate) mod fakes;
