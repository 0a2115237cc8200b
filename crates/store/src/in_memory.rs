//! In-memory title store.
//!
//! Intended for tests/dev. Filtering models the Postgres `simple` text
//! search configuration: queries and columns are tokenized on
//! non-alphanumeric boundaries and lowercased, and a text-search filter
//! matches when every query token occurs in the column.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use cinelog_catalog::{Title, TitleDraft};

use crate::title_store::{PoolStats, StoreError, StoreResult, TitleFilter, TitleStore};

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<i64, Title>,
    last_id: i64,
}

/// In-memory implementation of [`TitleStore`].
#[derive(Debug, Default)]
pub struct InMemoryTitleStore {
    inner: RwLock<Inner>,
}

impl InMemoryTitleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn text_search_matches(column: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needles = tokens(query);
    if needles.is_empty() {
        // A query with no lexemes matches nothing, same as an empty
        // tsquery in Postgres.
        return false;
    }
    let haystack = tokens(column);
    needles.iter().all(|needle| haystack.contains(needle))
}

fn exact_matches(column: &str, query: &str) -> bool {
    query.is_empty() || column.to_lowercase() == query.to_lowercase()
}

fn filter_matches(filter: &TitleFilter, title: &Title) -> bool {
    text_search_matches(&title.title, &filter.title)
        && text_search_matches(&title.country, &filter.country)
        && exact_matches(&title.title_type, &filter.title_type)
        && exact_matches(&title.director, &filter.director)
}

fn draft_to_title(id: i64, draft: &TitleDraft) -> Title {
    Title {
        id,
        title_type: draft.title_type.clone(),
        title: draft.title.clone(),
        director: draft.director.clone(),
        country: draft.country.clone(),
        release_year: draft.release_year,
    }
}

#[async_trait]
impl TitleStore for InMemoryTitleStore {
    async fn insert(&self, draft: &TitleDraft) -> StoreResult<Title> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.last_id += 1;
        let title = draft_to_title(inner.last_id, draft);
        inner.rows.insert(title.id, title.clone());
        Ok(title)
    }

    async fn get(&self, id: i64) -> StoreResult<Title> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.rows.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_all(&self, filter: &TitleFilter) -> StoreResult<Vec<Title>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        // BTreeMap iteration keeps ascending id order.
        Ok(inner
            .rows
            .values()
            .filter(|title| filter_matches(filter, title))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, draft: &TitleDraft) -> StoreResult<Title> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if !inner.rows.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        let title = draft_to_title(id, draft);
        inner.rows.insert(id, title.clone());
        Ok(title)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match inner.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    fn pool_stats(&self) -> PoolStats {
        PoolStats::default()
    }
}
