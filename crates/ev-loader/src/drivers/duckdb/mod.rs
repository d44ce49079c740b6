//! DuckDB driver.
//!
//! - [`dialect`]: statement text for COPY, INSERT, DELETE and COUNT
//! - [`loader`]: [`DuckDbLoader`], the [`TableLoader`](crate::core::TableLoader)
//!   implementation

pub mod dialect;
pub mod loader;

pub use dialect::InsertBuilder;
pub use loader::DuckDbLoader;
