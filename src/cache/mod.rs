// Cache module for local filesystem persistence.
// Backs the local store so cached pages survive process restarts.

pub mod paths;
pub mod store;

pub use paths::{cache_dir, default_store_path, store_path};
pub use store::{CachedData, delete, is_older_than, read_cached, write_cached};
