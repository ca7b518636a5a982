use diesel::prelude::*;
use interfaces_uniswap_subgraph::models::TokenMetadata;
use serde::Serialize;

use crate::db::schema::tokens;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = tokens)]
#[diesel(primary_key(token_address))]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    pub total_supply: f64,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
    pub decimals: i32,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = tokens)]
pub struct NewToken {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    pub total_supply: f64,
    pub volume_usd: f64,
    pub decimals: i32,
}

impl NewToken {
    pub fn from_metadata(token_address: &str, metadata: &TokenMetadata) -> Self {
        Self {
            token_address: token_address.to_string(),
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            total_supply: metadata.total_supply,
            volume_usd: metadata.volume_usd,
            decimals: metadata.decimals,
        }
    }
}
