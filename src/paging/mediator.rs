// Remote mediator.
// Decides whether a boundary load needs the remote source and merges results into the local store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;

use super::source::{FIRST_PAGE, PagedItem, RemoteSource};
use super::state::{LoadType, MediatorResult};
use super::store::{LocalStore, PagingMetadata};

/// Reconciles a paged remote source with a local store.
///
/// Only forward paging is supported: prepend loads always report the end of
/// pagination without touching the network.
pub struct RemoteMediator<S: RemoteSource> {
    source: Arc<S>,
    store: LocalStore<S::Item>,
    page_size: usize,
}

impl<S: RemoteSource> RemoteMediator<S> {
    pub fn new(source: Arc<S>, store: LocalStore<S::Item>, page_size: usize) -> Self {
        Self {
            source,
            store,
            page_size,
        }
    }

    pub fn store(&self) -> &LocalStore<S::Item> {
        &self.store
    }

    /// Run one boundary load. `boundary` is the loaded item at that edge, if any.
    ///
    /// A `Refresh` here refetches the last fetched page; use [`rebuild`](Self::rebuild)
    /// to restart from the first page.
    pub async fn mediate(&self, load_type: LoadType, boundary: Option<&S::Item>) -> MediatorResult {
        debug!(
            load = load_type.name(),
            boundary = ?boundary.map(PagedItem::id),
            "mediating"
        );

        Self::outcome(load_type, self.load(load_type).await)
    }

    /// Replace the whole store with the first remote page.
    ///
    /// The page is fetched before anything is touched; clearing, inserting and the
    /// metadata write then commit in one transaction. On error the store keeps its rows.
    pub async fn rebuild(&self) -> MediatorResult {
        debug!("rebuilding from first page");
        let result = self.fetch_and_merge(LoadType::Refresh, FIRST_PAGE, false).await;
        Self::outcome(LoadType::Refresh, result)
    }

    fn outcome(load_type: LoadType, result: Result<bool>) -> MediatorResult {
        match result {
            Ok(end_of_pagination_reached) => MediatorResult::Success {
                end_of_pagination_reached,
            },
            Err(err) => {
                warn!(load = load_type.name(), error = %err, "mediation failed");
                MediatorResult::Error(Arc::new(err))
            }
        }
    }

    /// Returns whether the end of pagination has been reached.
    async fn load(&self, load_type: LoadType) -> Result<bool> {
        let metadata = self.store.snapshot().metadata();

        let page = match (load_type, metadata) {
            (LoadType::Prepend, _) => return Ok(true),
            (LoadType::Refresh, Some(meta)) => meta.last_fetched_page.max(FIRST_PAGE),
            (LoadType::Refresh, None) => FIRST_PAGE,
            (LoadType::Append, Some(meta)) if meta.end_of_pagination_reached => return Ok(true),
            (LoadType::Append, Some(meta)) => meta.last_fetched_page + 1,
            (LoadType::Append, None) => FIRST_PAGE,
        };

        self.fetch_and_merge(load_type, page, metadata.is_some()).await
    }

    async fn fetch_and_merge(&self, load_type: LoadType, page: u32, had_metadata: bool) -> Result<bool> {
        let items = self.source.fetch_page(page).await?;

        if items.is_empty() {
            info!(load = load_type.name(), page, "empty page, end of pagination");
            if load_type == LoadType::Append && had_metadata {
                self.store
                    .transaction(|tx| {
                        if let Some(meta) = tx.metadata() {
                            tx.put_metadata(PagingMetadata::new(meta.last_fetched_page, true));
                        }
                        Ok(())
                    })
                    .await?;
            }
            return Ok(true);
        }

        let fetched = items.len();
        let end_of_pagination_reached = fetched < self.page_size;

        self.store
            .transaction(move |tx| {
                if load_type == LoadType::Refresh {
                    tx.clear_all();
                }
                tx.upsert_page(page, items);
                tx.put_metadata(PagingMetadata::new(page, end_of_pagination_reached));
                Ok(())
            })
            .await?;

        info!(
            load = load_type.name(),
            page, fetched, end_of_pagination_reached, "merged page"
        );
        Ok(end_of_pagination_reached)
    }
}
