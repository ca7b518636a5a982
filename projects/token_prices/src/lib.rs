//! Uniswap token price tracker
//!
//! - Subgraph polling and reconciliation in `sync/`
//! - Resampled history reads in `query/`
//! - REST API endpoints in `endpoints/`
//! - PostgreSQL models and queries in `db/`
//! - Requires DATABASE_URL env var, see `config` for the rest

pub mod config;
pub mod db;
pub mod endpoints;
pub mod query;
pub mod repository;
pub mod sync;
pub mod utils;
