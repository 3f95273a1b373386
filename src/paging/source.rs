// Remote data capabilities consumed by the pager.
// Implemented over HTTP by the api module and by scripted fakes in tests.

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

/// Index of the first remote page.
pub const FIRST_PAGE: u32 = 1;

/// A record that can be cached by the local store.
pub trait PagedItem: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Send + Sync;

    /// Stable unique identifier; merges deduplicate on it.
    fn id(&self) -> Self::Id;
}

/// Fetches numbered pages of items, in remote order.
#[async_trait]
pub trait RemoteSource: Send + Sync + 'static {
    type Item: PagedItem;

    /// Fails with a network error (connectivity) or a server error
    /// (non-2xx or malformed payload).
    async fn fetch_page(&self, page: u32) -> Result<Vec<Self::Item>>;
}

/// Fetches numbered pages of results for a free-text query.
#[async_trait]
pub trait QueryRemoteSource: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn search(&self, query: &str, page: u32) -> Result<Vec<Self::Item>>;
}
