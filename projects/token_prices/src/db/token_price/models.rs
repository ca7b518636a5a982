use diesel::prelude::*;
use interfaces_uniswap_subgraph::{index::token_hour_data_id, models::HourlyPrice};
use serde::Serialize;

use crate::db::schema::token_price_data;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = token_price_data)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceData {
    pub id: String,
    pub token_address: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
    pub period_start_unix: i64,
}

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = token_price_data)]
pub struct NewTokenPriceData {
    pub id: String,
    pub token_address: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub price_usd: f64,
    pub period_start_unix: i64,
}

impl NewTokenPriceData {
    /// Row for one hour bucket; the id is derived locally so repeated syncs
    /// of the same hour always hit the same row.
    pub fn from_hourly_price(token_address: &str, hour_index: i64, price: &HourlyPrice) -> Self {
        Self {
            id: token_hour_data_id(token_address, hour_index),
            token_address: token_address.to_string(),
            open: price.open,
            close: price.close,
            high: price.high,
            low: price.low,
            price_usd: price.price_usd,
            period_start_unix: price.period_start_unix,
        }
    }
}
