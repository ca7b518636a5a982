//! Uniswap v3 subgraph client
//!
//! - GraphQL requests in `index`
//! - Typed response shapes in `models`

pub mod index;
pub mod models;

pub use reqwest::StatusCode;
