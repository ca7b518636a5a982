use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use crate::sync::{SyncError, Synchronizer};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Sync failed: {source}")]
    Sync {
        #[from]
        source: SyncError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let HandlerError::Sync { source } = self;
        let status = match &source {
            SyncError::TokenNotSupported { .. } => StatusCode::FORBIDDEN,
            SyncError::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
            SyncError::Repository { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, source.to_string()).into_response()
    }
}

/// Axum handler: POST /tokens/{symbol}/sync
///
/// Runs the hourly refresh for one token right away.
pub async fn handler(
    Extension(synchronizer): Extension<Arc<Synchronizer>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    match synchronizer.sync_recurring(&symbol).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(source) => HandlerError::Sync { source }.into_response(),
    }
}
