use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use thiserror::Error;
use tracing::error;

use crate::{
    config::{TokenNotSupported, TokenTable},
    db::{token::models::Token, token_price::models::TokenPriceData},
    query::resample::{resample, to_history, TokenHistory, HISTORY_WINDOW_SECONDS},
    repository::{RepositoryError, TokenRepository},
    sync::hour::hour_start,
};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("ValidationError: {message}")]
    Validation { message: String },
    #[error(transparent)]
    TokenNotSupported {
        #[from]
        source: TokenNotSupported,
    },
    #[error("Repository: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

pub struct QueryService {
    repository: Arc<dyn TokenRepository>,
    tokens: TokenTable,
}

impl QueryService {
    pub fn new(repository: Arc<dyn TokenRepository>, tokens: TokenTable) -> Self {
        Self { repository, tokens }
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    pub async fn get_token_by_symbol(&self, symbol: &str) -> Result<Option<Token>, QueryError> {
        let address = self.tokens.resolve(symbol)?;

        self.repository.get_token(address).await.map_err(|source| {
            error!(symbol, address, "failed to read token: {source}");
            QueryError::Repository { source }
        })
    }

    /// Trailing-week history resampled every `interval_hours`, timestamps in
    /// the server's local time zone.
    pub async fn get_history(
        &self,
        symbol: &str,
        interval_hours: u32,
    ) -> Result<TokenHistory, QueryError> {
        self.get_history_at(symbol, interval_hours, Utc::now(), &Local)
            .await
    }

    pub async fn get_history_at<Tz: TimeZone>(
        &self,
        symbol: &str,
        interval_hours: u32,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<TokenHistory, QueryError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let points = self
            .resampled_points_at(symbol, interval_hours, now)
            .await?;
        let address = self.tokens.resolve(symbol)?;

        Ok(to_history(
            &symbol.trim().to_ascii_uppercase(),
            address,
            interval_hours,
            &points,
            tz,
        ))
    }

    /// Points of the trailing week whose start is a whole number of
    /// intervals away from the start of the current hour.
    pub async fn resampled_points_at(
        &self,
        symbol: &str,
        interval_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TokenPriceData>, QueryError> {
        if interval_hours == 0 {
            return Err(QueryError::Validation {
                message: "interval must be at least one hour".to_string(),
            });
        }

        let address = self.tokens.resolve(symbol)?;
        let now = now.timestamp();

        let points = self
            .repository
            .list_prices(address, now - HISTORY_WINDOW_SECONDS)
            .await
            .map_err(|source| {
                error!(symbol, address, "failed to read token prices: {source}");
                QueryError::Repository { source }
            })?;

        Ok(resample(points, hour_start(now), interval_hours))
    }
}
