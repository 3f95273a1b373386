// Query source.
// Remote-only paging for ad-hoc searches; nothing is cached.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use crate::error::Result;

use super::source::{FIRST_PAGE, QueryRemoteSource};

/// One page of search results with the keys of its neighbours.
#[derive(Debug, Clone)]
pub struct QueryPage<T> {
    pub page: u32,
    pub items: Vec<T>,
    pub prev_page: Option<u32>,
    /// `None` once the remote returned an empty page.
    pub next_page: Option<u32>,
}

impl<T> QueryPage<T> {
    pub fn end_of_pagination_reached(&self) -> bool {
        self.next_page.is_none()
    }
}

/// Pages a free-text query straight from the remote.
pub struct QuerySource<S> {
    source: Arc<S>,
    query: String,
}

impl<S> Clone for QuerySource<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            query: self.query.clone(),
        }
    }
}

impl<S: QueryRemoteSource> QuerySource<S> {
    pub fn new(source: Arc<S>, query: impl Into<String>) -> Self {
        Self {
            source,
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub async fn load(&self, page: u32) -> Result<QueryPage<S::Item>> {
        let page = page.max(FIRST_PAGE);
        let items = self.source.search(&self.query, page).await?;
        debug!(query = %self.query, page, results = items.len(), "search page loaded");

        let next_page = if items.is_empty() { None } else { Some(page + 1) };
        Ok(QueryPage {
            page,
            items,
            prev_page: (page > FIRST_PAGE).then(|| page - 1),
            next_page,
        })
    }

    /// Lazily load pages from the first until the remote returns an empty one.
    /// The stream ends after the first error.
    pub fn pages(&self) -> BoxStream<'static, Result<QueryPage<S::Item>>> {
        stream::try_unfold(
            (self.clone(), Some(FIRST_PAGE)),
            |(source, next)| async move {
                let Some(page) = next else {
                    return Ok(None);
                };
                let loaded = source.load(page).await?;
                if loaded.items.is_empty() {
                    return Ok(None);
                }
                let next = loaded.next_page;
                Ok(Some((loaded, (source, next))))
            },
        )
        .boxed()
    }
}
