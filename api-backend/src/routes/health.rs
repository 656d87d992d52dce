use axum::{Extension, Json};
use serde::Serialize;

use crate::types::Environment;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    /// Deployment stage the service was started in
    environment: &'static str,
    version: &'static str,
    rev: Option<&'static str>,
}

/// Liveness probe reporting the build and deployment stage
pub async fn handler(Extension(environment): Extension<Environment>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        environment: environment.as_str(),
        version: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
    })
}
