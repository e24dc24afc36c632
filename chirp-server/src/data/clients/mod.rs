pub(crate) mod clerk;
