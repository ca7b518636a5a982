use std::sync::Arc;

use interfaces_uniswap_subgraph::index::{BuildClientError, SubgraphClient};
use projects_token_prices::{
    config::{Settings, SettingsError},
    db::{build_pool, run_migrations, BuildPoolError, RunMigrationsError},
    endpoints::router,
    query::QueryService,
    repository::PgTokenRepository,
    sync::{
        schedule::{run_recurring_sync, spawn_initial_sync},
        Synchronizer,
    },
};
use thiserror::Error;
use tracing::info;
use utils_trace::init as tracing_init;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("Settings: {source}")]
    Settings {
        #[source]
        source: SettingsError,
    },
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("BuildPool: {source}")]
    BuildPool {
        #[source]
        source: BuildPoolError,
    },
    #[error("RunMigrations: {source}")]
    RunMigrations {
        #[source]
        source: RunMigrationsError,
    },
    #[error("BuildSubgraphClient: {source}")]
    BuildSubgraphClient {
        #[source]
        source: BuildClientError,
    },
    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },
    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let settings = Settings::from_env().map_err(|source| MainError::Settings { source })?;

    tracing_init(&settings.log_level).map_err(|source| MainError::TracingInit { source })?;

    let pool = build_pool(&settings.database_url)
        .map_err(|source| MainError::BuildPool { source })?;

    let applied = run_migrations(&pool).map_err(|source| MainError::RunMigrations { source })?;
    info!(applied, "database migrations up to date");

    let source = SubgraphClient::new(settings.subgraph_url.clone(), settings.subgraph_timeout)
        .map_err(|source| MainError::BuildSubgraphClient { source })?;
    info!(endpoint = source.endpoint(), "subgraph client ready");

    let repository = Arc::new(PgTokenRepository::new(pool));
    let synchronizer = Arc::new(Synchronizer::new(
        Arc::new(source),
        repository.clone(),
        settings.tokens.clone(),
    ));
    let query = Arc::new(QueryService::new(repository, settings.tokens.clone()));

    // Backfill runs in the background, the API serves whatever is stored so far.
    spawn_initial_sync(synchronizer.clone());
    tokio::spawn(run_recurring_sync(
        synchronizer.clone(),
        settings.sync_interval,
    ));

    let app = router(query, synchronizer);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Server running on addr: {}", settings.bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|source| MainError::Serve { source })?;

    Ok(())
}
