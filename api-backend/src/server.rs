use axum::{http::StatusCode, middleware, Extension, Router};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::{handle_panic, normalize_error_response};
use crate::routes;
use crate::types::{AppError, Environment, RESOURCE_NOT_FOUND_MESSAGE};

/// Wraps any router with the error-handling layers.
///
/// Panics and timeouts are caught inside the normalizer, so every failure
/// leaves the service as `{"success": false, "message": ...}`. Unmatched
/// paths answer 404 "Resource not found".
#[must_use]
pub fn with_error_handling(router: Router, environment: &Environment) -> Router {
    router
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::new(environment.request_timeout()))
        .layer(middleware::from_fn(normalize_error_response))
        .layer(TraceLayer::new_for_http())
}

/// Builds the application router for the given environment
#[must_use]
pub fn router(environment: &Environment) -> Router {
    with_error_handling(routes::handler(), environment).layer(Extension(environment.clone()))
}

async fn not_found() -> AppError {
    AppError::http(StatusCode::NOT_FOUND, RESOURCE_NOT_FOUND_MESSAGE)
}

/// Starts the server with the given environment
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(environment: Environment) -> anyhow::Result<()> {
    let router = router(&environment);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()?));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("API backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Received shutdown signal, draining connections...");
}
