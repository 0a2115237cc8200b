//! Postgres-backed title store.
//!
//! Every statement runs under an independent fixed deadline; an expiry is
//! reported as `StoreError::Timeout` and reaches clients only as the
//! generic server error.
//!
//! Filtering in `get_all` mirrors the search contract: full-text matching
//! (`to_tsvector`/`plainto_tsquery` with the `simple` configuration) for
//! `title` and `country`, case-insensitive equality for `title_type` and
//! `director`, with an empty parameter disabling that predicate.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use tracing::instrument;

use cinelog_catalog::{Title, TitleDraft};

use crate::title_store::{PoolStats, StoreError, StoreResult, TitleFilter, TitleStore};

/// Per-statement deadline.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub dsn: String,
    pub max_connections: u32,
    pub max_idle_time: Duration,
}

/// Open a connection pool and verify connectivity.
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .idle_timeout(settings.max_idle_time)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.dsn)
        .await
}

/// Apply pending schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Postgres implementation of [`TitleStore`].
#[derive(Debug, Clone)]
pub struct PostgresTitleStore {
    pool: PgPool,
}

impl PostgresTitleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_title(row: &PgRow) -> Result<Title, sqlx::Error> {
    Ok(Title {
        id: row.try_get("id")?,
        title_type: row.try_get("title_type")?,
        title: row.try_get("title")?,
        director: row.try_get("director")?,
        country: row.try_get("country")?,
        release_year: row.try_get("release_year")?,
    })
}

/// Run a statement future under the per-operation deadline.
async fn bounded<T, F>(fut: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(OPERATION_TIMEOUT, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StoreError::Timeout(OPERATION_TIMEOUT)),
    }
}

/// `fetch_one` reports a missing row as a query error; fold it into the
/// tagged variant callers actually branch on.
fn not_found_on_missing_row(err: StoreError) -> StoreError {
    match err {
        StoreError::Query(sqlx::Error::RowNotFound) => StoreError::NotFound,
        other => other,
    }
}

#[async_trait]
impl TitleStore for PostgresTitleStore {
    #[instrument(skip(self, draft), err)]
    async fn insert(&self, draft: &TitleDraft) -> StoreResult<Title> {
        let id: i64 = bounded(
            sqlx::query_scalar(
                r#"
                INSERT INTO titles (title_type, title, director, country, release_year)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(&draft.title_type)
            .bind(&draft.title)
            .bind(&draft.director)
            .bind(&draft.country)
            .bind(draft.release_year)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(Title {
            id,
            title_type: draft.title_type.clone(),
            title: draft.title.clone(),
            director: draft.director.clone(),
            country: draft.country.clone(),
            release_year: draft.release_year,
        })
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: i64) -> StoreResult<Title> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let row = bounded(
            sqlx::query(
                r#"
                SELECT id, title_type, title, director, country, release_year
                FROM titles
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(not_found_on_missing_row)?;

        Ok(row_to_title(&row)?)
    }

    #[instrument(skip(self), err)]
    async fn get_all(&self, filter: &TitleFilter) -> StoreResult<Vec<Title>> {
        let rows = bounded(
            sqlx::query(
                r#"
                SELECT id, title_type, title, director, country, release_year
                FROM titles
                WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
                AND (to_tsvector('simple', country) @@ plainto_tsquery('simple', $2) OR $2 = '')
                AND (LOWER(title_type) = LOWER($3) OR $3 = '')
                AND (LOWER(director) = LOWER($4) OR $4 = '')
                ORDER BY id
                "#,
            )
            .bind(&filter.title)
            .bind(&filter.country)
            .bind(&filter.title_type)
            .bind(&filter.director)
            .fetch_all(&self.pool),
        )
        .await?;

        let mut titles = Vec::with_capacity(rows.len());
        for row in &rows {
            titles.push(row_to_title(row)?);
        }
        Ok(titles)
    }

    #[instrument(skip(self, draft), err)]
    async fn update(&self, id: i64, draft: &TitleDraft) -> StoreResult<Title> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        // Single statement: the write and the read-back are atomic.
        let row = bounded(
            sqlx::query(
                r#"
                UPDATE titles
                SET title_type = $1, title = $2, director = $3, country = $4, release_year = $5
                WHERE id = $6
                RETURNING id, title_type, title, director, country, release_year
                "#,
            )
            .bind(&draft.title_type)
            .bind(&draft.title)
            .bind(&draft.director)
            .bind(&draft.country)
            .bind(draft.release_year)
            .bind(id)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(not_found_on_missing_row)?;

        Ok(row_to_title(&row)?)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: i64) -> StoreResult<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let result = bounded(
            sqlx::query("DELETE FROM titles WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn pool_stats(&self) -> PoolStats {
        PoolStats {
            open_connections: self.pool.size(),
            idle_connections: self.pool.num_idle() as u32,
            max_connections: self.pool.options().get_max_connections(),
        }
    }
}
