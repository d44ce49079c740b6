//! Capability interface for table loaders.
//!
//! A [`TableLoader`] owns one database connection and one target table. Each
//! backing engine provides one implementation; the pipeline only talks to
//! this trait, so swapping the embedded engine for a server-based one does
//! not touch the load or query logic.

use std::path::PathBuf;

use crate::config::LoadStrategy;
use crate::error::Result;

use super::value::Row;

/// Create, populate, and query a single table from a CSV file.
///
/// All operations are synchronous and block until the engine returns.
/// Nothing is retried; every failure propagates to the caller.
pub trait TableLoader {
    /// Point subsequent loads at a different CSV file.
    fn set_file_path(&mut self, path: PathBuf);

    /// Create the target table from the schema registry if it does not exist.
    ///
    /// Idempotent. Fails if an existing table has an incompatible shape.
    fn create_table_from_schema(&self) -> Result<()>;

    /// Load the file with the engine's native CSV ingestion.
    ///
    /// Append-only; returns the number of rows inserted.
    fn bulk_load(&mut self) -> Result<u64>;

    /// Read, normalize, and insert every record with generated INSERTs.
    ///
    /// Append-only; returns the number of rows inserted. A single bad row
    /// fails the whole call with nothing committed.
    fn manual_load(&mut self) -> Result<u64>;

    /// Parse and insert the file inside the engine in one statement,
    /// including the location column.
    ///
    /// Append-only; returns the number of rows inserted. Same table state as
    /// [`manual_load`](Self::manual_load) for the same file.
    fn transform_load(&mut self) -> Result<u64>;

    /// Load with the given strategy.
    fn load(&mut self, strategy: LoadStrategy) -> Result<u64> {
        match strategy {
            LoadStrategy::Bulk => self.bulk_load(),
            LoadStrategy::Manual => self.manual_load(),
            LoadStrategy::Transform => self.transform_load(),
        }
    }

    /// Delete every row from the target table, returning the count removed.
    fn clear_table(&self) -> Result<u64>;

    /// Clear the table, then run [`manual_load`](Self::manual_load).
    ///
    /// The two steps are not atomic: a failure during the load leaves the
    /// table empty.
    fn reload_data(&mut self) -> Result<u64> {
        self.clear_table()?;
        self.manual_load()
    }

    /// Execute arbitrary SQL and materialize every result row.
    ///
    /// The text is trusted and passed through unchanged.
    fn execute_sql(&self, query: &str) -> Result<Vec<Row>>;

    /// Current row count of the target table.
    fn row_count(&self) -> Result<i64>;

    /// Engine identifier (e.g., "duckdb").
    fn db_type(&self) -> &str;
}
