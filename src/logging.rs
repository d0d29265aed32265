//! Middleware for logging requests and responses.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::alert::Alert;

/// The number of bytes of a request body that are logged at the `info` level.
///
/// Longer bodies are truncated and the full body is logged at the `debug` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the method, URI, status code and handling time of each request.
///
/// Form bodies are logged as text. Other bodies, such as file uploads, are
/// only logged by their size.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let (parts, body) = request.into_parts();

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return (
                axum::http::StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Could not read the request body.".to_owned(),
                }
                .into_html(),
            )
                .into_response();
        }
    };

    let method = parts.method.clone();
    let uri = parts.uri.clone();
    log_request_body(&method, &uri, &parts.headers, &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let status = response.status();
    let elapsed = started_at.elapsed();

    if status.is_server_error() {
        tracing::error!("{method} {uri} -> {status} in {elapsed:.2?}");
    } else if status.is_client_error() {
        tracing::warn!("{method} {uri} -> {status} in {elapsed:.2?}");
    } else {
        tracing::info!("{method} {uri} -> {status} in {elapsed:.2?}");
    }

    response
}

fn log_request_body(
    method: &axum::http::Method,
    uri: &axum::http::Uri,
    headers: &HeaderMap,
    body: &Bytes,
) {
    if body.is_empty() {
        return;
    }

    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if !is_form {
        tracing::info!("{method} {uri} body: {} bytes", body.len());
        return;
    }

    let text = String::from_utf8_lossy(body);
    let truncated = truncate(&text, LOG_BODY_LENGTH_LIMIT);

    if truncated.len() < text.len() {
        tracing::info!("{method} {uri} body: {truncated}...");
        tracing::debug!("Full request body: {text:?}");
    } else {
        tracing::info!("{method} {uri} body: {text}");
    }
}

/// Cut `text` to at most `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}
