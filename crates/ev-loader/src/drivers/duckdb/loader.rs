//! DuckDB implementation of [`TableLoader`].

use std::path::PathBuf;
use std::time::Instant;

use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::normalize::{NormalizedRow, RowNormalizer};
use crate::core::schema::{PointEncoding, SchemaRegistry};
use crate::core::traits::TableLoader;
use crate::core::value::{Row, SqlValue};
use crate::error::{LoadError, Result};

use super::dialect::{
    copy_from_sql, count_sql, delete_all_sql, transform_insert_sql, InsertBuilder,
};

/// Table loader backed by an embedded DuckDB connection.
///
/// The connection is owned exclusively; with the default `:memory:`
/// database the table lives only as long as this value.
pub struct DuckDbLoader {
    conn: Connection,
    file_path: PathBuf,
    delimiter: char,
    table: String,
    schema: SchemaRegistry,
    encoding: PointEncoding,
    batch_rows: Option<usize>,
}

impl DuckDbLoader {
    /// Open the configured database and prepare it for loading.
    ///
    /// Installs and loads the spatial extension when
    /// `target.spatial_extension` is set.
    pub fn open(config: &Config) -> Result<Self> {
        let schema = config.schema_registry()?;

        let conn = if config.target.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.target.database)?
        };

        let encoding = if config.target.spatial_extension {
            conn.execute_batch("INSTALL spatial; LOAD spatial;")?;
            debug!("Loaded DuckDB spatial extension");
            PointEncoding::Spatial
        } else {
            PointEncoding::Struct
        };

        info!(
            "Opened DuckDB database {} (table {}, {} columns, location column {:?})",
            config.target.database,
            config.target.table,
            schema.len(),
            schema.location().name
        );

        Ok(Self {
            conn,
            file_path: config.source.path.clone(),
            delimiter: config.source.delimiter,
            table: config.target.table.clone(),
            schema,
            encoding,
            batch_rows: config.load.batch_rows,
        })
    }

    fn file_path_str(&self) -> Result<&str> {
        self.file_path.to_str().ok_or_else(|| {
            LoadError::Config(format!("source path is not valid UTF-8: {:?}", self.file_path))
        })
    }

    /// Read and normalize every record of the source file.
    fn read_rows(&self) -> Result<Vec<NormalizedRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter as u8)
            .from_path(&self.file_path)?;

        let headers = reader.headers()?.clone();
        let normalizer = RowNormalizer::new(&self.schema, &headers);
        let missing = normalizer.missing_columns();
        if missing > 0 {
            warn!(
                "{:?}: {} schema column(s) not present in the header, loading them as NULL",
                self.file_path, missing
            );
        }

        reader
            .records()
            .map(|record| -> Result<NormalizedRow> { Ok(normalizer.normalize(&record?)) })
            .collect()
    }

    fn insert_rows(
        conn: &Connection,
        builder: &InsertBuilder,
        rows: &[NormalizedRow],
    ) -> std::result::Result<usize, duckdb::Error> {
        let (sql, params) = builder.build(rows);
        debug!(
            "INSERT statement: {} rows, {} bytes, {} parameters",
            rows.len(),
            sql.len(),
            params.len()
        );
        conn.execute(&sql, params_from_iter(params))
    }
}

impl TableLoader for DuckDbLoader {
    fn set_file_path(&mut self, path: PathBuf) {
        self.file_path = path;
    }

    fn create_table_from_schema(&self) -> Result<()> {
        let ddl = self.schema.create_table_sql(&self.table, self.encoding)?;
        self.conn.execute_batch(&ddl)?;
        debug!("Created table {} (if absent)", self.table);
        Ok(())
    }

    fn bulk_load(&mut self) -> Result<u64> {
        let start = Instant::now();
        let sql = copy_from_sql(&self.table, self.file_path_str()?, self.delimiter)?;
        let before = self.row_count()?;

        self.conn
            .execute_batch(&sql)
            .map_err(|e| LoadError::load(&self.table, format!("COPY FROM {:?}: {}", self.file_path, e)))?;

        // COPY does not reliably report its row count; diff the table instead.
        let rows = (self.row_count()? - before).max(0);

        info!(
            "Time spent in CSV COPY: {:.2} seconds ({} rows into {})",
            start.elapsed().as_secs_f64(),
            rows,
            self.table
        );
        Ok(rows as u64)
    }

    fn manual_load(&mut self) -> Result<u64> {
        let start = Instant::now();
        let rows = self.read_rows()?;
        info!(
            "Time spent in CSV iteration: {:.2} seconds ({} records)",
            start.elapsed().as_secs_f64(),
            rows.len()
        );

        if rows.is_empty() {
            return Ok(0);
        }

        let builder = InsertBuilder::new(&self.table, &self.schema, self.encoding)?;
        let insert_start = Instant::now();
        let table = self.table.clone();
        let batch_rows = self.batch_rows.unwrap_or(rows.len());

        let inserted = if rows.len() <= batch_rows {
            Self::insert_rows(&self.conn, &builder, &rows)
                .map_err(|e| LoadError::load(&table, format!("INSERT batch: {}", e)))?
        } else {
            // Dropping the transaction without commit rolls it back.
            let tx = self.conn.transaction()?;
            let mut total = 0;
            for (i, chunk) in rows.chunks(batch_rows).enumerate() {
                total += Self::insert_rows(&tx, &builder, chunk).map_err(|e| {
                    LoadError::load(&table, format!("INSERT batch {}: {}", i + 1, e))
                })?;
            }
            tx.commit()?;
            total
        };

        info!(
            "Time spent in DB insert: {:.2} seconds ({} rows into {})",
            insert_start.elapsed().as_secs_f64(),
            inserted,
            table
        );
        Ok(inserted as u64)
    }

    fn transform_load(&mut self) -> Result<u64> {
        let start = Instant::now();
        let sql = transform_insert_sql(
            &self.table,
            &self.schema,
            self.encoding,
            self.file_path_str()?,
            self.delimiter,
        )?;
        debug!("Transform statement: {} bytes", sql.len());

        let rows = self.conn.execute(&sql, []).map_err(|e| {
            LoadError::load(&self.table, format!("INSERT FROM read_csv {:?}: {}", self.file_path, e))
        })?;

        info!(
            "Time spent in engine-side load: {:.2} seconds ({} rows into {})",
            start.elapsed().as_secs_f64(),
            rows,
            self.table
        );
        Ok(rows as u64)
    }

    fn clear_table(&self) -> Result<u64> {
        let removed = self.conn.execute(&delete_all_sql(&self.table)?, [])?;
        debug!("Cleared {} rows from {}", removed, self.table);
        Ok(removed as u64)
    }

    fn execute_sql(&self, query: &str) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(query)?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let width = row.as_ref().column_count();
            let values = (0..width)
                .map(|i| row.get::<_, Value>(i).map(SqlValue::from))
                .collect::<std::result::Result<Row, _>>()?;
            out.push(values);
        }
        Ok(out)
    }

    fn row_count(&self) -> Result<i64> {
        let rows = self.execute_sql(&count_sql(&self.table)?)?;
        rows.first()
            .and_then(|r| r.first())
            .and_then(SqlValue::as_i64)
            .ok_or_else(|| LoadError::load(&self.table, "COUNT(*) returned no rows"))
    }

    fn db_type(&self) -> &str {
        "duckdb"
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Boolean(v) => SqlValue::Bool(v),
            Value::TinyInt(v) => SqlValue::Int(v.into()),
            Value::SmallInt(v) => SqlValue::Int(v.into()),
            Value::Int(v) => SqlValue::Int(v.into()),
            Value::BigInt(v) => SqlValue::Int(v),
            Value::HugeInt(v) => i64::try_from(v)
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
            Value::UTinyInt(v) => SqlValue::Int(v.into()),
            Value::USmallInt(v) => SqlValue::Int(v.into()),
            Value::UInt(v) => SqlValue::Int(v.into()),
            Value::UBigInt(v) => i64::try_from(v)
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
            Value::Float(v) => SqlValue::Float(v.into()),
            Value::Double(v) => SqlValue::Float(v),
            Value::Decimal(v) => SqlValue::Text(v.to_string()),
            Value::Text(v) => SqlValue::Text(v),
            other => SqlValue::Text(format!("{:?}", other)),
        }
    }
}
