//! The Postgres adapter for the optimizer's `DecisionSink`/`RunStore` ports
//! (spec §6). Out of scope per spec §1, but the data shapes it gives are
//! concrete, so the adapter is implemented rather than stubbed.

pub mod error;
pub mod postgres;

pub use error::StorageError;
pub use postgres::PostgresStore;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(StorageError::Connection)
}
