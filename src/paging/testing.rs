// Test doubles for the paging module.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{PagerError, Result};

use super::source::{PagedItem, QueryRemoteSource, RemoteSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    pub id: u32,
    pub label: String,
}

impl TestItem {
    pub fn new(id: u32, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
        }
    }
}

impl PagedItem for TestItem {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

pub fn items(ids: Range<u32>) -> Vec<TestItem> {
    ids.map(|id| TestItem::new(id, &format!("item-{}", id)))
        .collect()
}

#[derive(Debug, Clone)]
pub enum Reply {
    Items(Vec<TestItem>),
    Timeout,
    Connect,
    Server,
}

/// Remote source answering from a per-page script. Unscripted pages are empty.
pub struct ScriptedSource {
    pages: Mutex<HashMap<u32, Reply>>,
    calls: Mutex<Vec<(Option<String>, u32)>>,
    gate: Semaphore,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        }
    }

    /// Every fetch blocks until `release` lets it through.
    pub fn gated() -> Self {
        Self {
            gate: Semaphore::new(0),
            ..Self::new()
        }
    }

    pub fn with_page(self, page: u32, items: Vec<TestItem>) -> Self {
        self.set_page(page, Reply::Items(items));
        self
    }

    pub fn set_page(&self, page: u32, reply: Reply) {
        self.pages.lock().unwrap().insert(page, reply);
    }

    pub fn release(&self, fetches: usize) {
        self.gate.add_permits(fetches);
    }

    pub fn fetched_pages(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|(_, page)| *page).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<(Option<String>, u32)> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, query: Option<&str>, page: u32) -> Result<Vec<TestItem>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.map(str::to_string), page));
        self.gate.acquire().await.unwrap().forget();

        let reply = self.pages.lock().unwrap().get(&page).cloned();
        match reply {
            None => Ok(Vec::new()),
            Some(Reply::Items(items)) => Ok(items),
            Some(Reply::Timeout) => Err(PagerError::timeout("read timed out")),
            Some(Reply::Connect) => Err(PagerError::connect("connection refused")),
            Some(Reply::Server) => Err(PagerError::Server("HTTP 500".into())),
        }
    }
}

#[async_trait]
impl RemoteSource for ScriptedSource {
    type Item = TestItem;

    async fn fetch_page(&self, page: u32) -> Result<Vec<TestItem>> {
        self.answer(None, page).await
    }
}

#[async_trait]
impl QueryRemoteSource for ScriptedSource {
    type Item = TestItem;

    async fn search(&self, query: &str, page: u32) -> Result<Vec<TestItem>> {
        self.answer(Some(query), page).await
    }
}
