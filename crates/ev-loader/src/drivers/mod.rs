//! Database driver implementations.
//!
//! Each driver module implements [`TableLoader`](crate::core::TableLoader)
//! for one engine. DuckDB is the only engine today.
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/postgres/`)
//! 2. Implement `TableLoader`, reusing `core::normalize` for the manual path
//! 3. Map the engine's native point type in its DDL builder

pub mod duckdb;

pub use self::duckdb::DuckDbLoader;
