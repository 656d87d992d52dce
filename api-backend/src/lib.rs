//! API backend with uniform JSON error responses

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Error-handling middleware
pub mod middleware;

/// Handler routes
pub mod routes;

/// Server setup
pub mod server;

/// Shared types: errors, extractors and configuration
pub mod types;
