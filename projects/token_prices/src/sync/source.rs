use async_trait::async_trait;
use interfaces_uniswap_subgraph::{
    index::{FetchError, SubgraphClient},
    models::{HourlyPriceResult, TokenMetadataResult},
};

/// Where token metadata and hourly prices come from.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_token_metadata(&self, address: &str) -> Result<TokenMetadataResult, FetchError>;

    async fn fetch_hourly_price(
        &self,
        address: &str,
        hour_index: i64,
    ) -> Result<HourlyPriceResult, FetchError>;
}

#[async_trait]
impl PriceSource for SubgraphClient {
    async fn fetch_token_metadata(&self, address: &str) -> Result<TokenMetadataResult, FetchError> {
        self.fetch_token(address).await
    }

    async fn fetch_hourly_price(
        &self,
        address: &str,
        hour_index: i64,
    ) -> Result<HourlyPriceResult, FetchError> {
        self.fetch_token_hour_data(address, hour_index).await
    }
}
