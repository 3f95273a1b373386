// Paging state types.
// Load directions, per-boundary load states and the snapshots handed to observers.

use std::sync::Arc;

use crate::error::PagerError;

use super::store::PagingMetadata;

/// Direction of a boundary load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadType {
    Refresh,
    Prepend,
    Append,
}

impl LoadType {
    pub const ALL: [LoadType; 3] = [LoadType::Refresh, LoadType::Prepend, LoadType::Append];

    pub fn name(&self) -> &'static str {
        match self {
            LoadType::Refresh => "refresh",
            LoadType::Prepend => "prepend",
            LoadType::Append => "append",
        }
    }
}

/// Loading state of one boundary.
#[derive(Debug, Clone)]
pub enum LoadState {
    NotLoading { end_of_pagination_reached: bool },
    Loading,
    Error(Arc<PagerError>),
}

impl Default for LoadState {
    fn default() -> Self {
        LoadState::NotLoading {
            end_of_pagination_reached: false,
        }
    }
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    pub fn error(&self) -> Option<&PagerError> {
        match self {
            LoadState::Error(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    pub fn end_of_pagination_reached(&self) -> bool {
        matches!(
            self,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        )
    }
}

/// One load state per boundary.
#[derive(Debug, Clone, Default)]
pub struct LoadStates {
    pub refresh: LoadState,
    pub prepend: LoadState,
    pub append: LoadState,
}

impl LoadStates {
    pub fn get(&self, load_type: LoadType) -> &LoadState {
        match load_type {
            LoadType::Refresh => &self.refresh,
            LoadType::Prepend => &self.prepend,
            LoadType::Append => &self.append,
        }
    }

    pub fn set(&mut self, load_type: LoadType, state: LoadState) {
        match load_type {
            LoadType::Refresh => self.refresh = state,
            LoadType::Prepend => self.prepend = state,
            LoadType::Append => self.append = state,
        }
    }

    /// First error across boundaries, refresh first.
    pub fn first_error(&self) -> Option<&PagerError> {
        self.refresh
            .error()
            .or_else(|| self.append.error())
            .or_else(|| self.prepend.error())
    }

    pub fn is_loading(&self) -> bool {
        LoadType::ALL.iter().any(|lt| self.get(*lt).is_loading())
    }
}

/// Outcome of one mediation.
#[derive(Debug, Clone)]
pub enum MediatorResult {
    Success { end_of_pagination_reached: bool },
    Error(Arc<PagerError>),
}

impl MediatorResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MediatorResult::Success { .. })
    }

    pub fn end_of_pagination_reached(&self) -> bool {
        matches!(
            self,
            MediatorResult::Success {
                end_of_pagination_reached: true
            }
        )
    }

    pub fn to_load_state(&self) -> LoadState {
        match self {
            MediatorResult::Success {
                end_of_pagination_reached,
            } => LoadState::NotLoading {
                end_of_pagination_reached: *end_of_pagination_reached,
            },
            MediatorResult::Error(err) => LoadState::Error(Arc::clone(err)),
        }
    }
}

/// What an observer sees on each emission: cached rows plus boundary states.
#[derive(Debug, Clone)]
pub struct PagingSnapshot<T> {
    /// Ordered, duplicate-free items currently materialized.
    pub window: Vec<T>,
    pub load_states: LoadStates,
    pub metadata: Option<PagingMetadata>,
}

impl<T> PagingSnapshot<T> {
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
