//! Healthcheck and debug endpoints.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use chrono::Utc;

use crate::app::dto;
use crate::app::{AppServices, codec};

pub async fn healthcheck(Extension(services): Extension<Arc<AppServices>>) -> Response {
    codec::respond(
        StatusCode::OK,
        &dto::HealthcheckEnvelope {
            status: "available",
            system_info: dto::SystemInfo {
                environment: services.environment.clone(),
                version: crate::VERSION,
            },
        },
        HeaderMap::new(),
    )
}

pub async fn debug_vars(Extension(services): Extension<Arc<AppServices>>) -> Response {
    codec::respond(
        StatusCode::OK,
        &dto::DebugVars {
            version: crate::VERSION,
            timestamp: Utc::now().timestamp(),
            database: services.titles.pool_stats(),
            metrics: services.metrics.snapshot(),
        },
        HeaderMap::new(),
    )
}
