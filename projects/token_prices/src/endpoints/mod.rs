pub mod tokens;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::{query::QueryService, sync::Synchronizer};

pub fn router(query: Arc<QueryService>, synchronizer: Arc<Synchronizer>) -> Router {
    Router::new()
        .route("/tokens/{symbol}", get(tokens::read::index::handler))
        .route(
            "/tokens/{symbol}/data",
            get(tokens::read_history::index::handler),
        )
        .route(
            "/tokens/{symbol}/chart",
            get(tokens::read_chart::index::handler),
        )
        .route("/tokens/{symbol}/sync", post(tokens::sync::index::handler))
        .layer(Extension(query))
        .layer(Extension(synchronizer))
}
