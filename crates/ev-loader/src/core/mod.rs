//! Core abstractions for the loading pipeline.
//!
//! - [`schema`]: ordered schema registry and declared column types
//! - [`point`]: `POINT (<lon> <lat>)` text parsing
//! - [`normalize`]: raw CSV record to typed row conversion
//! - [`identifier`]: identifier and literal quoting for generated SQL
//! - [`value`]: engine-agnostic result values
//! - [`traits`]: the [`TableLoader`] capability interface
//!
//! Everything here is engine-independent. The DuckDB-specific pieces live in
//! `drivers::duckdb`.

pub mod identifier;
pub mod normalize;
pub mod point;
pub mod schema;
pub mod traits;
pub mod value;

pub use normalize::{NormalizedRow, RowNormalizer};
pub use point::{parse_point, Point};
pub use schema::{Column, ColumnType, PointEncoding, SchemaRegistry};
pub use traits::TableLoader;
pub use value::{Row, SqlValue};
