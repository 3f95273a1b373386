// Presentation helpers.
// Turns load states into the messages and affordances a list screen shows.

use crate::error::{NetworkFailure, PagerError};
use crate::paging::{LoadState, LoadStates};

pub const SERVER_UNAVAILABLE: &str = "Server Unavailable";
pub const INTERNET_UNAVAILABLE: &str = "Internet Unavailable";
pub const UNKNOWN_ERROR: &str = "Unknown Error!";
pub const EMPTY_SEARCH_MESSAGE: &str = "Find your Favourite Hero!";

/// Human message for a load failure.
pub fn error_message(err: &PagerError) -> &'static str {
    match err.network_failure() {
        Some(NetworkFailure::Timeout) => SERVER_UNAVAILABLE,
        Some(NetworkFailure::Connect) => INTERNET_UNAVAILABLE,
        _ => UNKNOWN_ERROR,
    }
}

/// What to show when there are no items to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: &'static str,
    pub error_icon: bool,
    /// Manual refresh is only offered after a failure.
    pub refresh_enabled: bool,
}

impl Default for EmptyState {
    fn default() -> Self {
        Self {
            message: EMPTY_SEARCH_MESSAGE,
            error_icon: false,
            refresh_enabled: false,
        }
    }
}

impl EmptyState {
    pub fn from_load_state(state: &LoadState) -> Self {
        match state.error() {
            Some(err) => Self {
                message: error_message(err),
                error_icon: true,
                refresh_enabled: true,
            },
            None => Self::default(),
        }
    }

    pub fn from_load_states(states: &LoadStates) -> Self {
        match states.first_error() {
            Some(err) => Self {
                message: error_message(err),
                error_icon: true,
                refresh_enabled: true,
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_error_messages() {
        assert_eq!(error_message(&PagerError::timeout("slow")), SERVER_UNAVAILABLE);
        assert_eq!(error_message(&PagerError::connect("down")), INTERNET_UNAVAILABLE);
        assert_eq!(error_message(&PagerError::Server("500".into())), UNKNOWN_ERROR);
        assert_eq!(error_message(&PagerError::Cache("disk".into())), UNKNOWN_ERROR);
    }

    #[test]
    fn test_empty_state_for_error() {
        let state = LoadState::Error(Arc::new(PagerError::timeout("slow")));
        let empty = EmptyState::from_load_state(&state);
        assert_eq!(empty.message, SERVER_UNAVAILABLE);
        assert!(empty.error_icon);
        assert!(empty.refresh_enabled);
    }

    #[test]
    fn test_empty_state_without_error() {
        let empty = EmptyState::from_load_states(&LoadStates::default());
        assert_eq!(empty, EmptyState::default());
        assert_eq!(empty.message, EMPTY_SEARCH_MESSAGE);
    }
}
