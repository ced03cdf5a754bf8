use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::ORIGIN, HeaderValue, Method, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::errors::{error, ORIGIN_NOT_ALLOWED};

/// Browsers may only call the api from `allowed_origins`. An empty list
/// allows every origin.
///
/// Requests carrying an `Origin` header that is not on the list are rejected
/// with 403 before any other middleware runs. Requests without the header
/// (curl, server to server, same origin) are always served.
pub fn add<S: Clone + Send + Sync + 'static>(
    allowed_origins: Vec<HeaderValue>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| {
        if allowed_origins.is_empty() {
            return router.layer(layer(AllowOrigin::any()));
        }

        let allowed_origins = Arc::<[HeaderValue]>::from(allowed_origins);
        router
            .layer(layer(AllowOrigin::list(allowed_origins.iter().cloned())))
            .layer(from_fn_with_state(allowed_origins, enforce))
    }
}

fn layer(allow_origin: AllowOrigin) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
}

async fn enforce(
    State(allowed_origins): State<Arc<[HeaderValue]>>,
    request: Request,
    next: Next,
) -> Response {
    match request.headers().get(ORIGIN) {
        Some(origin) if !allowed_origins.contains(origin) => {
            warn!(?origin, "rejected request from origin that is not allowed");
            error(StatusCode::FORBIDDEN, ORIGIN_NOT_ALLOWED)
        }
        _ => next.run(request).await,
    }
}
