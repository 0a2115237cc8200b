//! Persistence for catalog titles.
//!
//! The `TitleStore` trait abstracts storage. `PostgresTitleStore` is the
//! production implementation; `InMemoryTitleStore` backs tests and local
//! development without a database.

pub mod in_memory;
pub mod postgres;
pub mod title_store;

pub use in_memory::InMemoryTitleStore;
pub use postgres::{PoolSettings, PostgresTitleStore, connect, migrate};
pub use title_store::{PoolStats, StoreError, StoreResult, TitleFilter, TitleStore};
