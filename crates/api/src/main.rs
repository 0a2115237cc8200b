use std::sync::Arc;

use anyhow::Context;

use cinelog_api::app::{AppServices, build_app};
use cinelog_api::config::Config;
use cinelog_api::limiter::RateLimiter;
use cinelog_observability::RequestMetrics;
use cinelog_store::PostgresTitleStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cinelog_observability::init();

    let config = Config::from_env()?;

    let pool = cinelog_store::connect(&config.pool_settings())
        .await
        .context("failed to open database connection pool")?;
    cinelog_store::migrate(&pool)
        .await
        .context("failed to apply database migrations")?;
    tracing::info!("database connection pool established");

    let services = Arc::new(AppServices {
        titles: Arc::new(PostgresTitleStore::new(pool)),
        metrics: Arc::new(RequestMetrics::new()),
        environment: config.environment.clone(),
    });
    let limiter = Arc::new(RateLimiter::new(config.limiter_rps, config.limiter_burst));

    let app = build_app(services, limiter);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(environment = %config.environment, "starting server on {addr}");

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
