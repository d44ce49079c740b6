//! # ev-loader
//!
//! Loads the Electric Vehicle Population CSV dataset into an embedded DuckDB
//! table and runs a fixed set of analytic queries over it.
//!
//! - **Schema registry** driving table creation and row layout
//! - **Point normalization** of `POINT (<lon> <lat>)` text into a native 2D point
//! - **Two load strategies**: engine-native `COPY` or parse + multi-row `INSERT`
//! - **Fixed reports** and a Parquet export partitioned by model year
//!
//! ## Example
//!
//! ```rust,no_run
//! use ev_loader::{Config, Pipeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let mut pipeline = Pipeline::new(config)?;
//!     let load = pipeline.prepare()?;
//!     println!("Loaded {} rows", load.rows_loaded);
//!     for report in pipeline.run_reports() {
//!         println!("{}: {} rows", report.name, report.rows.len());
//!     }
//!     pipeline.export()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod queries;

// Re-exports for convenient access
pub use config::{Config, LoadStrategy};
pub use self::core::{Row, SchemaRegistry, SqlValue, TableLoader};
pub use drivers::DuckDbLoader;
pub use error::{LoadError, Result};
pub use orchestrator::{LoadReport, Pipeline, PipelineResult, ReportResult};
pub use queries::QueryCatalog;
