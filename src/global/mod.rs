//! Per-user gvm state that lives outside any Go root: configuration, the
//! persisted environment, the session script and the archive cache.

pub mod cache;
pub mod utils;
