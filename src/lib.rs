// herolist: a paged hero list backed by a local cache-of-record.
// The paging module holds the engine; api, cache and presentation are its collaborators.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod paging;
pub mod presentation;

pub use config::{ApiConfig, DEFAULT_ITEMS_PER_PAGE, PagingConfig};
pub use error::{NetworkFailure, PagerError, Result};
