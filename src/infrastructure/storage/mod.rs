//! Storage infrastructure - PostgreSQL pool and schema

mod migrations;
mod postgres;

pub use migrations::{migrations, Migration, PostgresMigrator};
pub(crate) use postgres::map_write_error;
pub use postgres::{connect, PostgresConfig};
