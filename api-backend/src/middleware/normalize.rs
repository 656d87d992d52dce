use axum::{
    body::{to_bytes, Body},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::types::{AppError, Normalized};

/// Error bodies larger than this are not read back as a message
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Rewrites every error response that is not already in the error envelope.
///
/// Rejections from axum's own extractors, unmatched routes and timeouts
/// produce plain-text (or empty) bodies. Their status is kept and the body
/// text becomes the message, so clients only ever see one error shape.
pub async fn normalize_error_response(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error())
        || response.extensions().get::<Normalized>().is_some()
    {
        return response;
    }

    let message = read_message(response.into_body()).await;

    AppError::Http {
        status: Some(status),
        message,
    }
    .into_response()
}

async fn read_message(body: Body) -> Option<String> {
    match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        Err(err) => {
            tracing::debug!("Failed to read error body: {err}");
            None
        }
    }
}
