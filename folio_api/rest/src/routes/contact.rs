use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use folio_core_contact_contracts::{ContactFeatureService, ContactSendMessageError};
use folio_models::contact::ContactSubmission;
use folio_shared_contracts::rate_limit::RateLimitService;
use serde::Serialize;
use tracing::debug;

use crate::{
    errors::{
        error, method_not_allowed, INVALID_REQUEST_BODY, REQUEST_BODY_TOO_LARGE, SEND_FAILED,
    },
    middlewares::rate_limit,
    models::contact::ApiContactSubmission,
};

pub fn router<Contact, RateLimit>(
    service: Arc<Contact>,
    rate_limit: Arc<RateLimit>,
    body_limit: usize,
) -> Router<()>
where
    Contact: ContactFeatureService,
    RateLimit: RateLimitService,
{
    let send_email = routing::post(send_message::<Contact>)
        .route_layer(from_fn_with_state(
            rate_limit,
            rate_limit::middleware::<RateLimit>,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .fallback(method_not_allowed)
        .with_state(service);

    Router::new()
        .route("/send-email", send_email.clone())
        .route("/send-email/", send_email)
}

#[derive(Serialize)]
struct SendMessageResponse {
    message: &'static str,
}

async fn send_message<Contact: ContactFeatureService>(
    service: State<Arc<Contact>>,
    body: Result<Json<ApiContactSubmission>, JsonRejection>,
) -> Response {
    let submission = match body {
        Ok(Json(submission)) => submission.into(),
        // no json body at all is the same as an empty form
        Err(JsonRejection::MissingJsonContentType(_)) => ContactSubmission::default(),
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return error(StatusCode::PAYLOAD_TOO_LARGE, REQUEST_BODY_TOO_LARGE);
        }
        Err(err) => {
            debug!(%err, "failed to parse contact form body");
            return error(StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY);
        }
    };

    match service.send_message(submission).await {
        Ok(()) => Json(SendMessageResponse {
            message: "Email sent successfully.",
        })
        .into_response(),
        Err(ContactSendMessageError::Invalid(err)) => {
            error(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(ContactSendMessageError::Send) => {
            error(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED)
        }
    }
}
