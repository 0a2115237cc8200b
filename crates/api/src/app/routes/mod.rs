use axum::Router;
use axum::http::Method;
use axum::response::Response;
use axum::routing::get;

use crate::app::errors;

pub mod system;
pub mod titles;

/// Route table. Known paths hit with an unsupported method fall through
/// to the 405 responder; everything else falls back to the router-level
/// 404 installed in `build_app`.
pub fn router() -> Router {
    Router::new()
        .route(
            "/v1/healthcheck",
            get(system::healthcheck).fallback(method_not_allowed),
        )
        .route(
            "/v1/titles",
            get(titles::list)
                .post(titles::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/v1/titles/:id",
            get(titles::show)
                .put(titles::replace)
                .delete(titles::remove)
                .fallback(method_not_allowed),
        )
        .route(
            "/debug/vars",
            get(system::debug_vars).fallback(method_not_allowed),
        )
}

/// Router-level fallback for paths no route matches.
pub async fn not_found() -> Response {
    errors::not_found_response()
}

async fn method_not_allowed(method: Method) -> Response {
    errors::method_not_allowed_response(&method)
}
