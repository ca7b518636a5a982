pub mod schema;
pub mod token;
pub mod token_price;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Error)]
pub enum BuildPoolError {
    #[error("BuildPool: {source}")]
    BuildPool {
        #[from]
        source: r2d2::Error,
    },
}

pub fn build_pool(database_url: &str) -> Result<PgPool, BuildPoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder()
        .build(manager)
        .map_err(|source| BuildPoolError::BuildPool { source })
}

#[derive(Debug, Error)]
pub enum RunMigrationsError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("Failed to run database migrations: {source}")]
    DieselMigration {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Applies pending embedded migrations, returning how many ran.
pub fn run_migrations(pool: &PgPool) -> Result<usize, RunMigrationsError> {
    let mut conn = pool
        .get()
        .map_err(|source| RunMigrationsError::GetConnectionFromPool { source })?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|source| RunMigrationsError::DieselMigration { source })?;

    Ok(applied.len())
}
