use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use crate::{
    endpoints::tokens::TimeUnitQuery,
    query::{QueryError, QueryService},
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    GetHistory {
        #[from]
        source: QueryError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let HandlerError::GetHistory { source } = self;
        match source {
            QueryError::Validation { message } => (StatusCode::BAD_REQUEST, message).into_response(),
            QueryError::TokenNotSupported { source } => {
                (StatusCode::NOT_FOUND, source.to_string()).into_response()
            }
            QueryError::Repository { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

/// Axum handler: GET /tokens/{symbol}/data?timeUnit={hours}
pub async fn handler(
    Extension(query): Extension<Arc<QueryService>>,
    Path(symbol): Path<String>,
    Query(params): Query<TimeUnitQuery>,
) -> impl IntoResponse {
    match query.get_history(&symbol, params.time_unit).await {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(source) => HandlerError::GetHistory { source }.into_response(),
    }
}
