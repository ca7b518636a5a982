use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use thiserror::Error;

use crate::{
    endpoints::tokens::TimeUnitQuery,
    query::{QueryError, QueryService},
    utils::chart::{generate_price_chart, ChartConfig},
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    GetResampledPoints {
        #[from]
        source: QueryError,
    },
    #[error("ChartGeneration: {message}")]
    ChartGeneration { message: String },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::GetResampledPoints { source } => match source {
                QueryError::Validation { message } => {
                    (StatusCode::BAD_REQUEST, message).into_response()
                }
                QueryError::TokenNotSupported { source } => {
                    (StatusCode::NOT_FOUND, source.to_string()).into_response()
                }
                QueryError::Repository { source } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
                }
            },
            HandlerError::ChartGeneration { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Chart generation failed: {message}"),
            )
                .into_response(),
        }
    }
}

/// Axum handler: GET /tokens/{symbol}/chart?timeUnit={hours}
pub async fn handler(
    Extension(query): Extension<Arc<QueryService>>,
    Path(symbol): Path<String>,
    Query(params): Query<TimeUnitQuery>,
) -> impl IntoResponse {
    let points = match query
        .resampled_points_at(&symbol, params.time_unit, Utc::now())
        .await
    {
        Ok(points) => points,
        Err(source) => return HandlerError::GetResampledPoints { source }.into_response(),
    };

    match generate_price_chart(&symbol.trim().to_ascii_uppercase(), &points, &ChartConfig::default()) {
        Ok(svg_content) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/svg+xml"),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            svg_content,
        )
            .into_response(),
        Err(message) => HandlerError::ChartGeneration { message }.into_response(),
    }
}
