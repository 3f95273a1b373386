// Pager.
// Serves a live window over the local store and drives the remote mediator at its edges.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::is_older_than;
use crate::config::PagingConfig;
use crate::error::{PagerError, Result};

use super::mediator::RemoteMediator;
use super::source::RemoteSource;
use super::state::{LoadState, LoadStates, LoadType, MediatorResult, PagingSnapshot};
use super::store::LocalStore;

/// Marks one boundary as fetching; cleared on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct PagerInner<S: RemoteSource> {
    config: PagingConfig,
    store: LocalStore<S::Item>,
    mediator: RemoteMediator<S>,
    load_states: watch::Sender<LoadStates>,
    refreshing: AtomicBool,
    prepending: AtomicBool,
    appending: AtomicBool,
    /// Set once an append reports the end; blocks further appends until a refresh says otherwise.
    append_exhausted: AtomicBool,
    started: AtomicBool,
}

impl<S: RemoteSource> PagerInner<S> {
    fn in_flight(&self, load_type: LoadType) -> &AtomicBool {
        match load_type {
            LoadType::Refresh => &self.refreshing,
            LoadType::Prepend => &self.prepending,
            LoadType::Append => &self.appending,
        }
    }

    fn set_state(&self, load_type: LoadType, state: LoadState) {
        self.load_states
            .send_modify(|states| states.set(load_type, state));
    }

    /// Item at the edge the load extends from.
    fn boundary_item(&self, load_type: LoadType) -> Option<S::Item> {
        let snapshot = self.store.snapshot();
        match load_type {
            LoadType::Refresh => None,
            LoadType::Prepend => snapshot.items().next().cloned(),
            LoadType::Append => snapshot.items().last().cloned(),
        }
    }

    /// Idle -> Fetching -> Committed | Failed for one boundary.
    /// Returns `None` when a load for that boundary is already in flight.
    async fn run(&self, load_type: LoadType) -> Option<MediatorResult> {
        if load_type == LoadType::Append && self.append_exhausted.load(Ordering::Acquire) {
            return Some(MediatorResult::Success {
                end_of_pagination_reached: true,
            });
        }

        let Some(_in_flight) = InFlight::acquire(self.in_flight(load_type)) else {
            debug!(load = load_type.name(), "coalesced duplicate load");
            return None;
        };

        self.set_state(load_type, LoadState::Loading);
        let result = match load_type {
            LoadType::Refresh => self.mediator.rebuild().await,
            _ => {
                let boundary = self.boundary_item(load_type);
                self.mediator.mediate(load_type, boundary.as_ref()).await
            }
        };

        if let MediatorResult::Success {
            end_of_pagination_reached,
        } = result
        {
            match load_type {
                LoadType::Refresh => {
                    self.append_exhausted
                        .store(end_of_pagination_reached, Ordering::Release);
                    self.set_state(LoadType::Append, result.to_load_state());
                }
                LoadType::Append if end_of_pagination_reached => {
                    self.append_exhausted.store(true, Ordering::Release);
                }
                _ => {}
            }
        }
        self.set_state(load_type, result.to_load_state());

        Some(result)
    }
}

/// Windowed, self-refilling view over a local store.
pub struct Pager<S: RemoteSource> {
    inner: Arc<PagerInner<S>>,
}

impl<S: RemoteSource> Clone for Pager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RemoteSource> Pager<S> {
    pub fn new(config: PagingConfig, store: LocalStore<S::Item>, source: Arc<S>) -> Result<Self> {
        config.validate()?;

        let metadata = store.snapshot().metadata();
        let mut initial = LoadStates::default();
        let exhausted = metadata.is_some_and(|meta| meta.end_of_pagination_reached);
        if exhausted {
            initial.append = LoadState::NotLoading {
                end_of_pagination_reached: true,
            };
        }

        let mediator = RemoteMediator::new(source, store.clone(), config.page_size);
        let (load_states, _) = watch::channel(initial);

        Ok(Self {
            inner: Arc::new(PagerInner {
                config,
                store,
                mediator,
                load_states,
                refreshing: AtomicBool::new(false),
                prepending: AtomicBool::new(false),
                appending: AtomicBool::new(false),
                append_exhausted: AtomicBool::new(exhausted),
                started: AtomicBool::new(false),
            }),
        })
    }

    pub fn store(&self) -> &LocalStore<S::Item> {
        &self.inner.store
    }

    pub fn load_states(&self) -> LoadStates {
        self.inner.load_states.borrow().clone()
    }

    /// Current window re-derived from the store, paired with boundary states.
    pub fn snapshot(&self) -> PagingSnapshot<S::Item> {
        let stored = self.inner.store.snapshot();
        PagingSnapshot {
            window: stored.window(self.inner.config.page_size),
            load_states: self.load_states(),
            metadata: stored.metadata(),
        }
    }

    /// Infinite stream of snapshots, one per store commit or load-state change.
    ///
    /// Each call starts a fresh stream beginning with the current state. The first
    /// observer of this pager launches the initial refresh.
    pub fn observe(&self) -> BoxStream<'static, PagingSnapshot<S::Item>> {
        let pager = self.clone();
        let store_rx = self.inner.store.subscribe();
        let states_rx = self.inner.load_states.subscribe();

        stream::unfold(
            (pager, store_rx, states_rx, true),
            |(pager, mut store_rx, mut states_rx, first)| async move {
                if first {
                    pager.launch_initial_refresh();
                } else {
                    let open = tokio::select! {
                        changed = store_rx.changed() => changed.is_ok(),
                        changed = states_rx.changed() => changed.is_ok(),
                    };
                    if !open {
                        return None;
                    }
                }
                let _ = store_rx.borrow_and_update();
                let _ = states_rx.borrow_and_update();

                let snapshot = pager.snapshot();
                Some((snapshot, (pager, store_rx, states_rx, false)))
            },
        )
        .boxed()
    }

    fn launch_initial_refresh(&self) {
        if self.inner.started.swap(true, Ordering::AcqRel) || !self.inner.config.initial_refresh {
            return;
        }

        if let (Some(ttl), Some(meta)) = (
            self.inner.config.cache_ttl,
            self.inner.store.snapshot().metadata(),
        ) {
            if !is_older_than(meta.updated_at, ttl) {
                debug!("cache is fresh, skipping initial refresh");
                return;
            }
        }

        // Visible in the very first emission, before the task is scheduled.
        self.inner.set_state(LoadType::Refresh, LoadState::Loading);
        self.spawn(LoadType::Refresh);
    }

    /// Start a load on a background task that outlives the caller.
    fn spawn(&self, load_type: LoadType) -> tokio::task::JoinHandle<Option<MediatorResult>> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(load_type).await })
    }

    /// Run a load to completion even if the returned future is dropped.
    async fn launch(&self, load_type: LoadType) -> Option<MediatorResult> {
        match self.spawn(load_type).await {
            Ok(result) => result,
            Err(err) => {
                let err = Arc::new(PagerError::Other(format!("{} task failed: {}", load_type.name(), err)));
                self.inner
                    .set_state(load_type, LoadState::Error(Arc::clone(&err)));
                Some(MediatorResult::Error(err))
            }
        }
    }

    /// Rebuild the cache from the first remote page.
    ///
    /// Cached rows stay in place until that page arrives; they are then replaced in
    /// one commit. Returns `None` if a refresh is already in flight.
    pub async fn refresh(&self) -> Option<MediatorResult> {
        self.launch(LoadType::Refresh).await
    }

    /// Fetch the next page. Returns `None` if an append is already in flight.
    pub async fn append(&self) -> Option<MediatorResult> {
        self.launch(LoadType::Append).await
    }

    /// Backward paging is unsupported; always reports the end of pagination.
    pub async fn prepend(&self) -> Option<MediatorResult> {
        self.launch(LoadType::Prepend).await
    }

    /// Re-run every boundary whose last load failed.
    pub async fn retry(&self) -> Vec<(LoadType, Option<MediatorResult>)> {
        let states = self.load_states();
        let mut results = Vec::new();
        for load_type in LoadType::ALL {
            if states.get(load_type).is_error() {
                results.push((load_type, self.launch(load_type).await));
            }
        }
        results
    }

    /// Full cache invalidation: forget every cached row and the paging metadata and
    /// restart from the first page.
    ///
    /// The old rows are only dropped together with the commit of the new first page,
    /// so a failed fetch leaves the cache intact.
    pub async fn invalidate(&self) -> Option<MediatorResult> {
        info!("invalidating cache");
        self.refresh().await
    }

    /// Report that the consumer reached `index` in the window.
    ///
    /// Starts a background append when the index is within the prefetch distance
    /// of the end. Returns whether a load was started. Must be called within a
    /// tokio runtime.
    pub fn access(&self, index: usize) -> bool {
        let inner = &self.inner;
        if inner.append_exhausted.load(Ordering::Acquire)
            || inner.appending.load(Ordering::Acquire)
            || inner.refreshing.load(Ordering::Acquire)
        {
            return false;
        }

        let len = inner
            .store
            .snapshot()
            .window(inner.config.page_size)
            .len();
        if index < len.saturating_sub(inner.config.prefetch_distance + 1) {
            return false;
        }

        debug!(index, len, "prefetching next page");
        self.spawn(LoadType::Append);
        true
    }
}
