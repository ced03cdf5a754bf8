use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const NOT_FOUND: &str = "Not found";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INVALID_REQUEST_BODY: &str = "Invalid request body.";
pub const REQUEST_BODY_TOO_LARGE: &str = "Request body too large.";
pub const TOO_MANY_REQUESTS: &str =
    "Too many requests. Please wait a few minutes before trying again.";
pub const ORIGIN_NOT_ALLOWED: &str = "Origin not allowed.";
pub const SEND_FAILED: &str = "Failed to send email. Please try again later.";

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

pub fn error(code: StatusCode, detail: impl Serialize) -> Response {
    (code, Json(ApiError { error: detail })).into_response()
}

#[derive(Serialize)]
pub struct ApiError<D> {
    pub error: D,
}

pub async fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, NOT_FOUND)
}

pub async fn method_not_allowed() -> Response {
    error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}
