//! Handlers for the title resource.
//!
//! Each handler is thin orchestration: decode (400 on any strict-codec
//! failure), validate (422 with the full field map), call the store
//! (404 on the not-found tag, generic 500 otherwise), encode the
//! envelope.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Path, Query, Request};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::Response;

use cinelog_catalog::{Validator, validate_title};

use crate::app::dto;
use crate::app::{AppServices, codec, errors};

/// A path id must parse as a positive integer; anything else is
/// indistinguishable from a missing record.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListTitlesQuery>, QueryRejection>,
) -> Response {
    // A query string that cannot decode gets the same envelope as every
    // other client error, not the extractor's plain-text rejection.
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return errors::error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };

    match services.titles.get_all(&query.into_filter()).await {
        Ok(titles) => codec::respond(
            StatusCode::OK,
            &dto::TitlesEnvelope { titles },
            HeaderMap::new(),
        ),
        Err(err) => errors::store_error_response(err),
    }
}

pub async fn create(Extension(services): Extension<Arc<AppServices>>, req: Request) -> Response {
    let body: dto::CreateTitleRequest = match codec::read_json(req).await {
        Ok(body) => body,
        Err(err) => return errors::bad_request_response(&err),
    };
    let draft = body.into_draft();

    let mut v = Validator::new();
    validate_title(&mut v, &draft);
    if !v.is_valid() {
        return errors::failed_validation_response(&v.into_errors());
    }

    let title = match services.titles.insert(&draft).await {
        Ok(title) => title,
        Err(err) => return errors::store_error_response(err),
    };

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/v1/titles/{}", title.id)) {
        headers.insert(header::LOCATION, location);
    }
    codec::respond(
        StatusCode::CREATED,
        &dto::TitleEnvelope { title },
        headers,
    )
}

pub async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return errors::not_found_response();
    };

    match services.titles.get(id).await {
        Ok(title) => codec::respond(
            StatusCode::OK,
            &dto::TitleEnvelope { title },
            HeaderMap::new(),
        ),
        Err(err) => errors::store_error_response(err),
    }
}

pub async fn replace(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    req: Request,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return errors::not_found_response();
    };

    // The record must exist before the body is even read; a replacement
    // of a missing title is a 404, not a create.
    if let Err(err) = services.titles.get(id).await {
        return errors::store_error_response(err);
    }

    let body: dto::ReplaceTitleRequest = match codec::read_json(req).await {
        Ok(body) => body,
        Err(err) => return errors::bad_request_response(&err),
    };
    let draft = body.into_draft();

    let mut v = Validator::new();
    validate_title(&mut v, &draft);
    if !v.is_valid() {
        return errors::failed_validation_response(&v.into_errors());
    }

    match services.titles.update(id, &draft).await {
        Ok(title) => codec::respond(
            StatusCode::OK,
            &dto::TitleEnvelope { title },
            HeaderMap::new(),
        ),
        Err(err) => errors::store_error_response(err),
    }
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return errors::not_found_response();
    };

    match services.titles.delete(id).await {
        Ok(()) => codec::respond(
            StatusCode::OK,
            &dto::MessageEnvelope {
                message: "title successfully deleted",
            },
            HeaderMap::new(),
        ),
        Err(err) => errors::store_error_response(err),
    }
}
