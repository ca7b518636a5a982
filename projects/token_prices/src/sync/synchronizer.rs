use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use interfaces_uniswap_subgraph::{
    index::FetchError,
    models::{HourlyPriceResult, TokenMetadataResult},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    config::{TokenNotSupported, TokenTable},
    db::{
        token::models::{NewToken, Token},
        token_price::models::NewTokenPriceData,
    },
    repository::{RepositoryError, TokenRepository},
    sync::{
        hour::{hour_index, trailing_hours, BACKFILL_HOURS},
        source::PriceSource,
    },
};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    TokenNotSupported {
        #[from]
        source: TokenNotSupported,
    },
    #[error("SourceUnavailable for {address}: {source}")]
    SourceUnavailable { address: String, source: FetchError },
    #[error("Repository: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

/// Outcome of one sync pass for one symbol.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub symbol: String,
    pub token_address: String,
    pub requested_hours: usize,
    /// Ids of the price points written in this pass.
    pub stored: Vec<String>,
    /// Hour indices the subgraph has no data for.
    pub missing: Vec<i64>,
    pub failures: Vec<SampleFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFailure {
    pub hour_index: i64,
    pub error: String,
}

pub struct Synchronizer {
    source: Arc<dyn PriceSource>,
    repository: Arc<dyn TokenRepository>,
    tokens: TokenTable,
}

impl Synchronizer {
    pub fn new(
        source: Arc<dyn PriceSource>,
        repository: Arc<dyn TokenRepository>,
        tokens: TokenTable,
    ) -> Self {
        Self {
            source,
            repository,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    /// Token metadata plus the trailing seven days of hourly prices.
    pub async fn sync_initial(&self, symbol: &str) -> Result<SyncReport, SyncError> {
        self.sync_initial_at(symbol, Utc::now()).await
    }

    pub async fn sync_initial_at(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<SyncReport, SyncError> {
        let token = self.sync_token(symbol).await?;
        let hours = trailing_hours(now.timestamp(), BACKFILL_HOURS).collect();

        self.sync_hours(symbol, &token.token_address, hours).await
    }

    /// Token metadata plus the price point of the current hour.
    pub async fn sync_recurring(&self, symbol: &str) -> Result<SyncReport, SyncError> {
        self.sync_recurring_at(symbol, Utc::now()).await
    }

    pub async fn sync_recurring_at(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<SyncReport, SyncError> {
        let token = self.sync_token(symbol).await?;
        let hours = vec![hour_index(now.timestamp())];

        self.sync_hours(symbol, &token.token_address, hours).await
    }

    /// Fetches the token's metadata and upserts it.
    pub async fn sync_token(&self, symbol: &str) -> Result<Token, SyncError> {
        let address = self.tokens.resolve(symbol)?;

        let metadata = match self.source.fetch_token_metadata(address).await {
            Ok(TokenMetadataResult::Found(metadata)) => metadata,
            Ok(TokenMetadataResult::NotFound) => {
                warn!(symbol, address, "token not indexed by the subgraph");
                return Err(SyncError::TokenNotSupported {
                    source: TokenNotSupported {
                        symbol: symbol.to_string(),
                    },
                });
            }
            Err(source) => {
                error!(
                    symbol,
                    address,
                    status = ?source.status(),
                    body = source.body().unwrap_or_default(),
                    "token metadata fetch failed: {source}"
                );
                return Err(SyncError::SourceUnavailable {
                    address: address.to_string(),
                    source,
                });
            }
        };

        let token = self
            .repository
            .upsert_token(NewToken::from_metadata(address, &metadata))
            .await
            .map_err(|source| {
                error!(symbol, address, "failed to save token: {source}");
                SyncError::Repository { source }
            })?;

        info!(
            symbol,
            address,
            total_supply = token.total_supply,
            volume_usd = token.volume_usd,
            "token data saved"
        );

        Ok(token)
    }

    /// Fetches every hour concurrently, then writes every found point
    /// concurrently. In a multi-hour pass a failed fetch only costs its own
    /// hour; a single-hour pass returns the fetch error. A failed write is
    /// returned once all writes have settled.
    async fn sync_hours(
        &self,
        symbol: &str,
        address: &str,
        hours: Vec<i64>,
    ) -> Result<SyncReport, SyncError> {
        let fetches = hours.iter().map(|&hour| async move {
            (hour, self.source.fetch_hourly_price(address, hour).await)
        });
        let outcomes = join_all(fetches).await;
        let single_hour = hours.len() == 1;

        let mut report = SyncReport {
            symbol: symbol.trim().to_ascii_uppercase(),
            token_address: address.to_string(),
            requested_hours: hours.len(),
            stored: Vec::new(),
            missing: Vec::new(),
            failures: Vec::new(),
        };

        let mut points = Vec::new();
        for (hour, outcome) in outcomes {
            match outcome {
                Ok(HourlyPriceResult::Found(price)) => {
                    points.push(NewTokenPriceData::from_hourly_price(address, hour, &price));
                }
                Ok(HourlyPriceResult::NotFound) => {
                    debug!(symbol, hour, "no hour data");
                    report.missing.push(hour);
                }
                Err(source) => {
                    warn!(
                        symbol,
                        hour,
                        status = ?source.status(),
                        "hour data fetch failed: {source}"
                    );
                    if single_hour {
                        return Err(SyncError::SourceUnavailable {
                            address: address.to_string(),
                            source,
                        });
                    }
                    report.failures.push(SampleFailure {
                        hour_index: hour,
                        error: source.to_string(),
                    });
                }
            }
        }

        let writes = points
            .into_iter()
            .map(|point| self.repository.upsert_price_point(point));

        let mut first_error = None;
        for result in join_all(writes).await {
            match result {
                Ok(stored) => report.stored.push(stored.id),
                Err(source) => {
                    error!(symbol, "failed to save token price: {source}");
                    first_error.get_or_insert(source);
                }
            }
        }

        if let Some(source) = first_error {
            return Err(SyncError::Repository { source });
        }

        info!(
            symbol,
            requested = report.requested_hours,
            stored = report.stored.len(),
            missing = report.missing.len(),
            failed = report.failures.len(),
            "token prices synced"
        );

        Ok(report)
    }
}
