//! Image gallery backend service

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// HTTP routes
pub mod routes;

/// Server bootstrap
pub mod server;

/// Object store access
pub mod storage;

/// Configuration, errors and extractors
pub mod types;
