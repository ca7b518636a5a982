use diesel::prelude::*;
use thiserror::Error;

use crate::db::{schema::token_price_data::dsl::*, token_price::models::*};

#[derive(Debug, Error)]
pub enum UpsertTokenPriceDataError {
    #[error("UpsertTokenPriceData: {source}")]
    UpsertTokenPriceData {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn upsert_token_price_data(
    conn: &mut PgConnection,
    new: &NewTokenPriceData,
) -> Result<TokenPriceData, UpsertTokenPriceDataError> {
    diesel::insert_into(token_price_data)
        .values(new)
        .on_conflict(id)
        .do_update()
        .set(new)
        .get_result(conn)
        .map_err(|source| UpsertTokenPriceDataError::UpsertTokenPriceData { source })
}

#[derive(Debug, Error)]
pub enum ListTokenPriceDataSinceError {
    #[error("ListTokenPriceDataSince: {source}")]
    ListTokenPriceDataSince {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn list_token_price_data_since(
    conn: &mut PgConnection,
    address: &str,
    since_epoch_seconds: i64,
) -> Result<Vec<TokenPriceData>, ListTokenPriceDataSinceError> {
    token_price_data
        .filter(token_address.eq(address))
        .filter(period_start_unix.ge(since_epoch_seconds))
        .order_by(period_start_unix.asc())
        .load::<TokenPriceData>(conn)
        .map_err(|source| ListTokenPriceDataSinceError::ListTokenPriceDataSince { source })
}
