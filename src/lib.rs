//! Reports the most recently uploaded pack in a bucket together with its
//! SHA-1, computing and caching the checksum on first request.

use services::store::PackStore;
use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

/// Shared handler state: the bucket binding injected at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PackStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PackStore>) -> Self {
        Self { store }
    }
}
