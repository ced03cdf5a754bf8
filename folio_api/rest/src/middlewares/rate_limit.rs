use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use folio_models::rate_limit::RateLimitDecision;
use folio_shared_contracts::rate_limit::RateLimitService;
use tracing::warn;

use super::client_ip::ClientIp;
use crate::errors::{error, internal_server_error, TOO_MANY_REQUESTS};

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
static RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Counts the request against the budget of the client ip before the handler
/// (and the body parser) runs.
pub async fn middleware<RateLimit: RateLimitService>(
    State(service): State<Arc<RateLimit>>,
    Extension(client_ip): Extension<ClientIp>,
    request: Request,
    next: Next,
) -> Response {
    let decision = match service.check_and_consume(&client_ip.to_string()).await {
        Ok(decision) => decision,
        Err(err) => return internal_server_error(err),
    };

    let headers = headers(&decision);

    if !decision.allowed {
        warn!(%client_ip, limit = decision.limit, "rate limit exceeded");
        let retry_after = HeaderValue::from(seconds(decision.reset));
        return (
            [(RETRY_AFTER, retry_after)],
            headers,
            error(StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS),
        )
            .into_response();
    }

    let mut response = next.run(request).await;
    response.headers_mut().extend(headers);
    response
}

fn headers(decision: &RateLimitDecision) -> HeaderMap {
    [
        (RATELIMIT_LIMIT.clone(), decision.limit),
        (RATELIMIT_REMAINING.clone(), decision.remaining),
        (RATELIMIT_RESET.clone(), seconds(decision.reset)),
    ]
    .into_iter()
    .map(|(name, value)| (name, HeaderValue::from(value)))
    .collect()
}

/// Whole seconds, rounded up.
fn seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
