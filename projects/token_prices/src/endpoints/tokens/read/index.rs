use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use crate::query::{QueryError, QueryService};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("TokenNotFound: {symbol}")]
    TokenNotFound { symbol: String },
    #[error(transparent)]
    GetTokenBySymbol {
        #[from]
        source: QueryError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::TokenNotFound { symbol } => (
                StatusCode::NOT_FOUND,
                format!("Token {symbol} not found in database"),
            )
                .into_response(),
            HandlerError::GetTokenBySymbol { source } => match source {
                QueryError::TokenNotSupported { source } => {
                    (StatusCode::NOT_FOUND, source.to_string()).into_response()
                }
                QueryError::Validation { message } => {
                    (StatusCode::BAD_REQUEST, message).into_response()
                }
                QueryError::Repository { source } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
                }
            },
        }
    }
}

/// Axum handler: GET /tokens/{symbol}
pub async fn handler(
    Extension(query): Extension<Arc<QueryService>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    match query.get_token_by_symbol(&symbol).await {
        Ok(Some(token)) => (StatusCode::OK, Json(token)).into_response(),
        Ok(None) => HandlerError::TokenNotFound { symbol }.into_response(),
        Err(source) => HandlerError::GetTokenBySymbol { source }.into_response(),
    }
}
