#![allow(dead_code)]

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use interfaces_uniswap_subgraph::{
    index::{token_hour_data_id, FetchError},
    models::{HourlyPrice, HourlyPriceResult, TokenMetadata, TokenMetadataResult},
    StatusCode,
};
use projects_token_prices::{
    config::TokenTable,
    db::{
        token::models::{NewToken, Token},
        token_price::models::{NewTokenPriceData, TokenPriceData},
    },
    query::QueryService,
    repository::{RepositoryError, TokenRepository},
    sync::{PriceSource, Synchronizer},
};

pub const WBTC: &str = "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599";
pub const GNO: &str = "0x6810e776880c02933d47db1b9fc05908e5386b96";
pub const SHIB: &str = "0x95ad61b0a150d79219dcf64e1e6cc01f0b64c4ce";

/// 2024-05-01T12:30:00Z, half way through an hour.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
}

pub fn wbtc_metadata() -> TokenMetadata {
    TokenMetadata {
        name: "Wrapped BTC".to_string(),
        symbol: "WBTC".to_string(),
        total_supply: 18240.0,
        volume_usd: 120242943725.3597,
        decimals: 8,
    }
}

pub fn metadata(name: &str, symbol: &str, decimals: i32) -> TokenMetadata {
    TokenMetadata {
        name: name.to_string(),
        symbol: symbol.to_string(),
        total_supply: 1_000_000.0,
        volume_usd: 5_000_000.0,
        decimals,
    }
}

/// Deterministic price for an hour bucket.
pub fn price_at(address: &str, hour_index: i64) -> HourlyPrice {
    let base = 100.0 + (hour_index % 1_000) as f64;
    HourlyPrice {
        id: token_hour_data_id(address, hour_index),
        period_start_unix: hour_index * 3_600,
        open: base,
        close: base + 0.5,
        high: base + 1.0,
        low: base - 1.0,
        price_usd: base + 0.25,
    }
}

fn unavailable() -> FetchError {
    FetchError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "Error".to_string(),
    }
}

/// Price source answering from in-memory tables.
#[derive(Default)]
pub struct ScriptedPriceSource {
    metadata: Mutex<HashMap<String, TokenMetadata>>,
    metadata_unavailable: Mutex<BTreeSet<String>>,
    failing_hours: Mutex<BTreeSet<i64>>,
    missing_hours: Mutex<BTreeSet<i64>>,
    hour_requests: AtomicUsize,
}

impl ScriptedPriceSource {
    pub fn with_default_tokens() -> Self {
        let source = Self::default();
        source.set_metadata(WBTC, wbtc_metadata());
        source.set_metadata(GNO, metadata("Gnosis Token", "GNO", 18));
        source.set_metadata(SHIB, metadata("SHIBA INU", "SHIB", 18));
        source
    }

    pub fn set_metadata(&self, address: &str, metadata: TokenMetadata) {
        self.metadata
            .lock()
            .unwrap()
            .insert(address.to_string(), metadata);
    }

    pub fn remove_metadata(&self, address: &str) {
        self.metadata.lock().unwrap().remove(address);
    }

    pub fn fail_metadata(&self, address: &str) {
        self.metadata_unavailable
            .lock()
            .unwrap()
            .insert(address.to_string());
    }

    pub fn fail_hours(&self, hours: impl IntoIterator<Item = i64>) {
        self.failing_hours.lock().unwrap().extend(hours);
    }

    pub fn miss_hours(&self, hours: impl IntoIterator<Item = i64>) {
        self.missing_hours.lock().unwrap().extend(hours);
    }

    pub fn hour_requests(&self) -> usize {
        self.hour_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    async fn fetch_token_metadata(&self, address: &str) -> Result<TokenMetadataResult, FetchError> {
        if self.metadata_unavailable.lock().unwrap().contains(address) {
            return Err(unavailable());
        }

        Ok(match self.metadata.lock().unwrap().get(address) {
            Some(metadata) => TokenMetadataResult::Found(metadata.clone()),
            None => TokenMetadataResult::NotFound,
        })
    }

    async fn fetch_hourly_price(
        &self,
        address: &str,
        hour_index: i64,
    ) -> Result<HourlyPriceResult, FetchError> {
        self.hour_requests.fetch_add(1, Ordering::SeqCst);

        if self.failing_hours.lock().unwrap().contains(&hour_index) {
            return Err(unavailable());
        }
        if self.missing_hours.lock().unwrap().contains(&hour_index) {
            return Ok(HourlyPriceResult::NotFound);
        }

        Ok(HourlyPriceResult::Found(price_at(address, hour_index)))
    }
}

/// Repository with the same upsert rules as the PostgreSQL one.
#[derive(Default)]
pub struct MemoryTokenRepository {
    tokens: Mutex<BTreeMap<String, Token>>,
    prices: Mutex<BTreeMap<String, TokenPriceData>>,
    fail_price_writes: Mutex<BTreeSet<String>>,
}

impl MemoryTokenRepository {
    pub fn price_count(&self) -> usize {
        self.prices.lock().unwrap().len()
    }

    pub fn price(&self, id: &str) -> Option<TokenPriceData> {
        self.prices.lock().unwrap().get(id).cloned()
    }

    pub fn fail_price_write(&self, id: &str) {
        self.fail_price_writes.lock().unwrap().insert(id.to_string());
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn upsert_token(&self, new: NewToken) -> Result<Token, RepositoryError> {
        let mut tokens = self.tokens.lock().unwrap();
        let token = tokens
            .entry(new.token_address.clone())
            .and_modify(|token| {
                token.total_supply = new.total_supply;
                token.volume_usd = new.volume_usd;
            })
            .or_insert_with(|| Token {
                token_address: new.token_address.clone(),
                name: new.name.clone(),
                symbol: new.symbol.clone(),
                total_supply: new.total_supply,
                volume_usd: new.volume_usd,
                decimals: new.decimals,
            });
        Ok(token.clone())
    }

    async fn upsert_price_point(
        &self,
        new: NewTokenPriceData,
    ) -> Result<TokenPriceData, RepositoryError> {
        if self.fail_price_writes.lock().unwrap().contains(&new.id) {
            return Err(RepositoryError::Backend {
                message: format!("write rejected for {}", new.id),
            });
        }
        if !self.tokens.lock().unwrap().contains_key(&new.token_address) {
            return Err(RepositoryError::Backend {
                message: format!("foreign key violation: {}", new.token_address),
            });
        }

        let row = TokenPriceData {
            id: new.id,
            token_address: new.token_address,
            open: new.open,
            close: new.close,
            high: new.high,
            low: new.low,
            price_usd: new.price_usd,
            period_start_unix: new.period_start_unix,
        };
        self.prices
            .lock()
            .unwrap()
            .insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn get_token(&self, address: &str) -> Result<Option<Token>, RepositoryError> {
        Ok(self.tokens.lock().unwrap().get(address).cloned())
    }

    async fn list_prices(
        &self,
        address: &str,
        since_epoch_seconds: i64,
    ) -> Result<Vec<TokenPriceData>, RepositoryError> {
        let mut rows: Vec<TokenPriceData> = self
            .prices
            .lock()
            .unwrap()
            .values()
            .filter(|row| row.token_address == address && row.period_start_unix >= since_epoch_seconds)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.period_start_unix);
        Ok(rows)
    }
}

pub struct Harness {
    pub source: Arc<ScriptedPriceSource>,
    pub repository: Arc<MemoryTokenRepository>,
    pub synchronizer: Arc<Synchronizer>,
    pub query: Arc<QueryService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_source(ScriptedPriceSource::with_default_tokens())
    }

    pub fn with_source(source: ScriptedPriceSource) -> Self {
        let source = Arc::new(source);
        let repository = Arc::new(MemoryTokenRepository::default());
        let tokens = TokenTable::default();
        let synchronizer = Arc::new(Synchronizer::new(
            source.clone(),
            repository.clone(),
            tokens.clone(),
        ));
        let query = Arc::new(QueryService::new(repository.clone(), tokens));

        Self {
            source,
            repository,
            synchronizer,
            query,
        }
    }
}
