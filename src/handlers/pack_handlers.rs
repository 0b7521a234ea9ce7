//! HTTP handler for the latest-pack endpoint.
//! Every path is served by [`dispatch`]; only `GET` does any work.

use crate::{
    AppState,
    errors::AppError,
    models::pack::LatestPack,
    services::pack_service,
};
use axum::{
    Json,
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
};

/// Route a request on its method: `GET` resolves the latest pack, everything
/// else is answered with 405.
pub async fn dispatch(method: Method, State(state): State<AppState>) -> Response {
    match method {
        Method::GET => latest_pack(State(state)).await.into_response(),
        _ => AppError::MethodNotAllowed.into_response(),
    }
}

/// `GET` — report the newest pack and its SHA-1.
///
/// When the checksum had to be computed, its write-back keeps running after
/// the response has been sent.
pub async fn latest_pack(State(state): State<AppState>) -> Result<Json<LatestPack>, AppError> {
    let (pack, _write_back) = pack_service::latest_pack(state.store.clone()).await?;
    tracing::debug!("serving {} with sha1 {}", pack.key, pack.sha1);
    Ok(Json(pack))
}
