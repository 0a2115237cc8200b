use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use cinelog_catalog::{Title, TitleDraft};

/// Storage failures, tagged so callers can branch without inspecting
/// message strings.
///
/// Handlers map `NotFound` to 404 and every other variant to the generic
/// server error; the detail inside `Query` and `Timeout` is for logs only.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matched the requested identifier.
    #[error("record not found")]
    NotFound,
    /// The statement did not complete within the per-operation deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    /// Any other database failure (connectivity, constraint, decode).
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Search constraints for listing titles. An empty string means the
/// field is unconstrained.
///
/// `title` and `country` are matched with full-text search (order and
/// case insensitive, whole words); `title_type` and `director` are
/// case-insensitive exact matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    pub title: String,
    pub country: String,
    pub title_type: String,
    pub director: String,
}

/// Connection pool gauges for the debug snapshot.
///
/// The in-memory store reports zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub open_connections: u32,
    pub idle_connections: u32,
    pub max_connections: u32,
}

/// Storage operations over the titles table.
///
/// Every id-addressed operation treats `id < 1` as `NotFound` without
/// touching storage; identifiers are assigned by the store and are
/// always positive.
#[async_trait]
pub trait TitleStore: Send + Sync {
    /// Persist a new title, returning it with its assigned id.
    async fn insert(&self, draft: &TitleDraft) -> StoreResult<Title>;

    /// Fetch one title by id.
    async fn get(&self, id: i64) -> StoreResult<Title>;

    /// Fetch all titles matching `filter`, ordered by ascending id.
    async fn get_all(&self, filter: &TitleFilter) -> StoreResult<Vec<Title>>;

    /// Replace every writable field of an existing title, returning the
    /// stored result.
    async fn update(&self, id: i64, draft: &TitleDraft) -> StoreResult<Title>;

    /// Remove one title by id.
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Current connection pool gauges.
    fn pool_stats(&self) -> PoolStats;
}
