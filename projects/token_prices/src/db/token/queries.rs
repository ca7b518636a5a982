use diesel::{prelude::*, upsert::excluded};
use thiserror::Error;

use crate::db::{schema::tokens::dsl::*, token::models::*};

#[derive(Debug, Error)]
pub enum UpsertTokenError {
    #[error("UpsertToken: {source}")]
    UpsertToken {
        #[from]
        source: diesel::result::Error,
    },
}

/// Inserts the token, or refreshes only its supply and volume when the
/// address is already known.
pub fn upsert_token(conn: &mut PgConnection, new: &NewToken) -> Result<Token, UpsertTokenError> {
    diesel::insert_into(tokens)
        .values(new)
        .on_conflict(token_address)
        .do_update()
        .set((
            total_supply.eq(excluded(total_supply)),
            volume_usd.eq(excluded(volume_usd)),
        ))
        .get_result(conn)
        .map_err(|source| UpsertTokenError::UpsertToken { source })
}

#[derive(Debug, Error)]
pub enum GetTokenByAddressError {
    #[error("GetTokenByAddress: {source}")]
    GetTokenByAddress {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn get_token_by_address(
    conn: &mut PgConnection,
    address: &str,
) -> Result<Option<Token>, GetTokenByAddressError> {
    tokens
        .find(address)
        .first::<Token>(conn)
        .optional()
        .map_err(|source| GetTokenByAddressError::GetTokenByAddress { source })
}
