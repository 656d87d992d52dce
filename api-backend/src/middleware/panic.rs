use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::types::AppError;

/// Turns a handler panic into a generic 500 in the error envelope.
///
/// The panic payload is logged but never sent to the client.
#[allow(clippy::needless_pass_by_value)]
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    tracing::error!("Handler panicked: {detail}");

    AppError::Http {
        status: None,
        message: None,
    }
    .into_response()
}
