//! The service exposes a single route: every path goes to
//! [`dispatch`](crate::handlers::pack_handlers::dispatch).
//!
//! - `GET   *` — `{"key", "sha1"}` of the newest pack, or 404 "No pack found"
//! - other `*` — 405 "Method Not Allowed" with `Allow: GET`

use crate::{AppState, handlers::pack_handlers::dispatch};
use axum::Router;

/// Build the router. State is the bucket binding shared by all requests.
pub fn routes() -> Router<AppState> {
    Router::new().fallback(dispatch)
}
