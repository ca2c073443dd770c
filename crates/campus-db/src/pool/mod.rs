//! PostgreSQL pool and migrations.

mod postgres;

pub use postgres::{run_migrations, DatabaseConfig, PgPool};
