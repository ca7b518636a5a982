use async_trait::async_trait;
use diesel::PgConnection;
use thiserror::Error;

use crate::db::{
    token::{
        models::{NewToken, Token},
        queries::{get_token_by_address, upsert_token, GetTokenByAddressError, UpsertTokenError},
    },
    token_price::{
        models::{NewTokenPriceData, TokenPriceData},
        queries::{
            list_token_price_data_since, upsert_token_price_data, ListTokenPriceDataSinceError,
            UpsertTokenPriceDataError,
        },
    },
    PgPool,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error(transparent)]
    UpsertToken {
        #[from]
        source: UpsertTokenError,
    },
    #[error(transparent)]
    UpsertTokenPriceData {
        #[from]
        source: UpsertTokenPriceDataError,
    },
    #[error(transparent)]
    GetTokenByAddress {
        #[from]
        source: GetTokenByAddressError,
    },
    #[error(transparent)]
    ListTokenPriceDataSince {
        #[from]
        source: ListTokenPriceDataSinceError,
    },
    #[error("BlockingTask: {source}")]
    BlockingTask {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Backend: {message}")]
    Backend { message: String },
}

/// Persistence contract of the synchronizer and the query service.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Creates the token, or updates only `total_supply` and `volume_usd`.
    async fn upsert_token(&self, new: NewToken) -> Result<Token, RepositoryError>;

    /// Creates the price point, or overwrites the row with the same id.
    async fn upsert_price_point(
        &self,
        new: NewTokenPriceData,
    ) -> Result<TokenPriceData, RepositoryError>;

    async fn get_token(&self, address: &str) -> Result<Option<Token>, RepositoryError>;

    /// Points of `address` starting at or after `since_epoch_seconds`,
    /// ascending by `period_start_unix`.
    async fn list_prices(
        &self,
        address: &str,
        since_epoch_seconds: i64,
    ) -> Result<Vec<TokenPriceData>, RepositoryError>;
}

/// Diesel-backed repository; every query runs on the blocking pool.
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, query: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, RepositoryError> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|source| RepositoryError::GetConnectionFromPool { source })?;
            query(&mut conn)
        })
        .await
        .map_err(|source| RepositoryError::BlockingTask { source })?
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn upsert_token(&self, new: NewToken) -> Result<Token, RepositoryError> {
        self.with_conn(move |conn| Ok(upsert_token(conn, &new)?))
            .await
    }

    async fn upsert_price_point(
        &self,
        new: NewTokenPriceData,
    ) -> Result<TokenPriceData, RepositoryError> {
        self.with_conn(move |conn| Ok(upsert_token_price_data(conn, &new)?))
            .await
    }

    async fn get_token(&self, address: &str) -> Result<Option<Token>, RepositoryError> {
        let address = address.to_string();
        self.with_conn(move |conn| Ok(get_token_by_address(conn, &address)?))
            .await
    }

    async fn list_prices(
        &self,
        address: &str,
        since_epoch_seconds: i64,
    ) -> Result<Vec<TokenPriceData>, RepositoryError> {
        let address = address.to_string();
        self.with_conn(move |conn| {
            Ok(list_token_price_data_since(
                conn,
                &address,
                since_epoch_seconds,
            )?)
        })
        .await
    }
}
