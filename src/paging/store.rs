// Local store: the cache-of-record for one paged list.
// Holds item rows and paging metadata, commits writes atomically and notifies observers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::cache;
use crate::error::{PagerError, Result};

use super::source::PagedItem;

/// Progress of remote paging for the list held in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingMetadata {
    pub last_fetched_page: u32,
    pub end_of_pagination_reached: bool,
    pub updated_at: DateTime<Utc>,
}

impl PagingMetadata {
    pub fn new(last_fetched_page: u32, end_of_pagination_reached: bool) -> Self {
        Self {
            last_fetched_page,
            end_of_pagination_reached,
            updated_at: Utc::now(),
        }
    }
}

/// An item tagged with the page it was fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row<T> {
    pub page: u32,
    /// Insertion order, used to order rows within a page.
    pub seq: u64,
    pub item: T,
}

/// Immutable view of the whole store at one commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot<T> {
    rows: Vec<Row<T>>,
    metadata: Option<PagingMetadata>,
    next_seq: u64,
}

impl<T> Default for StoreSnapshot<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            metadata: None,
            next_seq: 0,
        }
    }
}

impl<T: PagedItem> StoreSnapshot<T> {
    /// Rows sorted by page, then insertion order.
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|row| &row.item)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn metadata(&self) -> Option<PagingMetadata> {
        self.metadata
    }

    pub fn get(&self, id: &T::Id) -> Option<&Row<T>> {
        self.rows.iter().find(|row| &row.item.id() == id)
    }

    /// Number of distinct pages with at least one row.
    pub fn loaded_pages(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.page)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Materialize up to `page_size * loaded_pages` items in store order.
    pub fn window(&self, page_size: usize) -> Vec<T> {
        let limit = page_size.saturating_mul(self.loaded_pages());
        self.items().take(limit).cloned().collect()
    }
}

/// Mutable access to a private copy of the store, applied only if the whole closure succeeds.
pub struct StoreTx<'a, T> {
    draft: &'a mut StoreSnapshot<T>,
}

impl<T: PagedItem> StoreTx<'_, T> {
    /// Remove every row and the paging metadata.
    pub fn clear_all(&mut self) {
        self.draft.rows.clear();
        self.draft.metadata = None;
        self.draft.next_seq = 0;
    }

    /// Insert items fetched from `page`, replacing any row with the same identifier.
    pub fn upsert_page(&mut self, page: u32, items: Vec<T>) {
        for item in items {
            let id = item.id();
            self.draft.rows.retain(|row| row.item.id() != id);
            let seq = self.draft.next_seq;
            self.draft.next_seq += 1;
            self.draft.rows.push(Row { page, seq, item });
        }
        self.draft.rows.sort_by_key(|row| (row.page, row.seq));
    }

    pub fn metadata(&self) -> Option<PagingMetadata> {
        self.draft.metadata
    }

    pub fn put_metadata(&mut self, metadata: PagingMetadata) {
        self.draft.metadata = Some(metadata);
    }
}

struct StoreInner<T> {
    path: Option<PathBuf>,
    state: watch::Sender<Arc<StoreSnapshot<T>>>,
    write_lock: Arc<Mutex<()>>,
}

impl<T: PagedItem> StoreInner<T> {
    /// Persist then publish. Runs with the write lock held.
    fn commit(&self, draft: StoreSnapshot<T>) -> Result<()> {
        if let Some(path) = &self.path {
            cache::write_cached(path, &draft).map_err(PagerError::cache)?;
        }
        debug!(rows = draft.len(), "store commit");
        self.state.send_replace(Arc::new(draft));
        Ok(())
    }
}

/// Shared handle to a local store. Cloning shares the same storage.
pub struct LocalStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for LocalStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: PagedItem> LocalStore<T> {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_snapshot(None, StoreSnapshot::default())
    }

    /// Open a durable store backed by a JSON file, loading any previous contents.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = cache::read_cached::<StoreSnapshot<T>>(&path)
            .map_err(PagerError::cache)?
            .map(|cached| cached.data)
            .unwrap_or_default();
        debug!(path = %path.display(), rows = snapshot.len(), "opened store");
        Ok(Self::with_snapshot(Some(path), snapshot))
    }

    fn with_snapshot(path: Option<PathBuf>, snapshot: StoreSnapshot<T>) -> Self {
        let (state, _) = watch::channel(Arc::new(snapshot));
        Self {
            inner: Arc::new(StoreInner {
                path,
                state,
                write_lock: Arc::new(Mutex::new(())),
            }),
        }
    }

    /// The last committed state.
    pub fn snapshot(&self) -> Arc<StoreSnapshot<T>> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Receiver notified after every commit.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreSnapshot<T>>> {
        self.inner.state.subscribe()
    }

    /// Run `f` against a copy of the store and commit the copy if it succeeds.
    ///
    /// Writers are serialized. The commit runs on a blocking task that holds the
    /// write lock, so a dropped caller never leaves a half-applied write.
    pub async fn transaction<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut StoreTx<'_, T>) -> Result<R>,
    {
        let guard = Arc::clone(&self.inner.write_lock).lock_owned().await;

        let mut draft = StoreSnapshot::clone(&self.inner.state.borrow());
        let value = f(&mut StoreTx { draft: &mut draft }).map_err(|err| match err {
            PagerError::Cache(_) => err,
            other => PagerError::cache(other),
        })?;

        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            inner.commit(draft)
        })
        .await
        .map_err(PagerError::cache)??;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::testing::{TestItem, items};
    use tempfile::TempDir;

    fn ids(snapshot: &StoreSnapshot<TestItem>) -> Vec<u32> {
        snapshot.items().map(|item| item.id).collect()
    }

    #[tokio::test]
    async fn test_upsert_orders_by_page_then_insertion() {
        let store = LocalStore::<TestItem>::in_memory();
        store
            .transaction(|tx| {
                tx.upsert_page(2, items(10..12));
                tx.upsert_page(1, items(1..3));
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(ids(&store.snapshot()), vec![1, 2, 10, 11]);
        assert_eq!(store.snapshot().loaded_pages(), 2);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_on_id_collision() {
        let store = LocalStore::<TestItem>::in_memory();
        store
            .transaction(|tx| {
                tx.upsert_page(1, items(1..4));
                Ok(())
            })
            .await
            .unwrap();

        let replacement = vec![TestItem::new(2, "fresh")];
        store
            .transaction(|tx| {
                tx.upsert_page(2, replacement);
                Ok(())
            })
            .await
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(ids(&snapshot), vec![1, 3, 2]);
        let row = snapshot.get(&2).unwrap();
        assert_eq!(row.page, 2);
        assert_eq!(row.item.label, "fresh");
    }

    #[tokio::test]
    async fn test_failed_transaction_leaves_store_unchanged() {
        let store = LocalStore::<TestItem>::in_memory();
        store
            .transaction(|tx| {
                tx.upsert_page(1, items(1..3));
                tx.put_metadata(PagingMetadata::new(1, false));
                Ok(())
            })
            .await
            .unwrap();
        let before = store.snapshot();

        let result: Result<()> = store
            .transaction(|tx| {
                tx.clear_all();
                tx.upsert_page(2, items(5..9));
                Err(PagerError::Other("constraint violated".into()))
            })
            .await;

        assert!(matches!(result, Err(PagerError::Cache(_))));
        let after = store.snapshot();
        assert_eq!(ids(&after), ids(&before));
        assert_eq!(after.metadata(), before.metadata());
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_published() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let store: LocalStore<TestItem> = LocalStore::open(blocker.join("heroes.json")).unwrap();
        let rx = store.subscribe();

        let result = store
            .transaction(|tx| {
                tx.upsert_page(1, items(1..3));
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(PagerError::Cache(_))));
        assert!(store.snapshot().is_empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_durable_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stores").join("heroes.json");

        {
            let store = LocalStore::<TestItem>::open(&path).unwrap();
            store
                .transaction(|tx| {
                    tx.upsert_page(1, items(1..4));
                    tx.put_metadata(PagingMetadata::new(1, false));
                    Ok(())
                })
                .await
                .unwrap();
        }

        let reopened: LocalStore<TestItem> = LocalStore::open(&path).unwrap();
        let snapshot = reopened.snapshot();
        assert_eq!(ids(&snapshot), vec![1, 2, 3]);
        assert_eq!(snapshot.metadata().unwrap().last_fetched_page, 1);
    }

    #[tokio::test]
    async fn test_clear_and_insert_commit_together() {
        let store = LocalStore::<TestItem>::in_memory();
        store
            .transaction(|tx| {
                tx.upsert_page(1, items(1..3));
                tx.put_metadata(PagingMetadata::new(1, true));
                Ok(())
            })
            .await
            .unwrap();
        let mut rx = store.subscribe();

        store
            .transaction(|tx| {
                tx.clear_all();
                tx.upsert_page(1, items(7..9));
                tx.put_metadata(PagingMetadata::new(1, false));
                Ok(())
            })
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(ids(&snapshot), vec![7, 8]);
        assert!(!snapshot.metadata().unwrap().end_of_pagination_reached);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_window_caps_at_loaded_pages() {
        let mut snapshot = StoreSnapshot::default();
        let mut tx = StoreTx {
            draft: &mut snapshot,
        };
        tx.upsert_page(1, items(1..6));

        assert_eq!(snapshot.window(3).len(), 3);
        assert_eq!(snapshot.window(20).len(), 5);
    }
}
