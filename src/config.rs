// Configuration for the pager and the remote API.
// Values are passed explicitly to constructors; nothing is read from globals.

use std::time::Duration;

use crate::error::{PagerError, Result};

/// Items per remote page, shared by the remote source and the pager.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 3;

/// Base URL of the hero REST API.
pub const DEFAULT_API_URL: &str = "http://10.0.2.2:8080";

const DEFAULT_PREFETCH_DISTANCE: usize = 1;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Paging tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingConfig {
    /// Expected number of items in a full remote page.
    pub page_size: usize,
    /// How close (in items) to the end of the window an access must be to trigger an append.
    pub prefetch_distance: usize,
    /// Launch a refresh when the first observer attaches.
    pub initial_refresh: bool,
    /// Skip the initial refresh if cached metadata is younger than this.
    pub cache_ttl: Option<Duration>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_ITEMS_PER_PAGE,
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
            initial_refresh: true,
            cache_ttl: None,
        }
    }
}

impl PagingConfig {
    pub fn new(page_size: usize) -> Result<Self> {
        let config = Self {
            page_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    pub fn with_initial_refresh(mut self, enabled: bool) -> Self {
        self.initial_refresh = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(PagerError::Config("page size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Build from the HEROES_API_URL environment variable, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var("HEROES_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self {
                base_url: url.trim().trim_end_matches('/').to_string(),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}
