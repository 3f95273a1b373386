// Hero API endpoint functions.
// Typed methods for the list and search endpoints, and their paging source adapters.

use async_trait::async_trait;

use crate::error::{PagerError, Result};
use crate::paging::{QueryRemoteSource, RemoteSource};

use super::client::HeroApiClient;
use super::types::{ApiResponse, Hero};

impl HeroApiClient {
    /// Get one page of all heroes.
    pub async fn get_all_heroes(&self, page: u32) -> Result<ApiResponse> {
        let params = [("page", page.to_string())];
        let response = self.get_with_params("/boruto/heroes", &params).await?;
        let body: ApiResponse = response.json().await?;
        ensure_success(body)
    }

    /// Search heroes by name.
    pub async fn search_heroes(&self, name: &str, page: u32) -> Result<ApiResponse> {
        let params = [("name", name.to_string()), ("page", page.to_string())];
        let response = self
            .get_with_params("/boruto/heroes/search", &params)
            .await?;
        let body: ApiResponse = response.json().await?;
        ensure_success(body)
    }
}

/// Reject envelopes the server marked as unsuccessful.
fn ensure_success(body: ApiResponse) -> Result<ApiResponse> {
    if body.success {
        Ok(body)
    } else {
        Err(PagerError::Server(
            body.message
                .unwrap_or_else(|| "request rejected".to_string()),
        ))
    }
}

#[async_trait]
impl RemoteSource for HeroApiClient {
    type Item = Hero;

    async fn fetch_page(&self, page: u32) -> Result<Vec<Hero>> {
        Ok(self.get_all_heroes(page).await?.heroes)
    }
}

#[async_trait]
impl QueryRemoteSource for HeroApiClient {
    type Item = Hero;

    async fn search(&self, query: &str, page: u32) -> Result<Vec<Hero>> {
        Ok(self.search_heroes(query, page).await?.heroes)
    }
}
