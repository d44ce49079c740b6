//! Pipeline orchestrator - table setup, load, reports, and export.

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, LoadStrategy};
use crate::core::traits::TableLoader;
use crate::core::value::Row;
use crate::drivers::DuckDbLoader;
use crate::error::Result;
use crate::queries::{QueryCatalog, EXPORT_FILE_NAME};

/// Runs the fixed pipeline against one [`TableLoader`].
pub struct Pipeline<L: TableLoader = DuckDbLoader> {
    config: Config,
    catalog: QueryCatalog,
    loader: L,
}

/// Result of creating and loading the table.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Target table.
    pub table: String,

    /// Strategy used.
    pub strategy: LoadStrategy,

    /// Rows inserted by this load.
    pub rows_loaded: u64,

    /// Table row count after the load.
    pub row_count: i64,

    /// Create + load duration in seconds.
    pub duration_seconds: f64,
}

/// Result of one analytic report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub name: String,
    pub rows: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of the Parquet export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Export root, a directory of hive-style partitions. DuckDB URL-encodes
    /// the partition key, so entries are named `Model%20Year=<n>`.
    pub path: PathBuf,

    /// Rows returned by the export statement.
    pub rows: Vec<Row>,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Absent when the load failed and the caller chose to continue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    pub reports: Vec<ReportResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportReport>,
    pub duration_seconds: f64,
}

impl PipelineResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Pipeline<DuckDbLoader> {
    /// Open a DuckDB-backed pipeline for `config`.
    pub fn new(config: Config) -> Result<Self> {
        let loader = DuckDbLoader::open(&config)?;
        Self::with_loader(config, loader)
    }
}

impl<L: TableLoader> Pipeline<L> {
    /// Build a pipeline around an existing loader.
    pub fn with_loader(config: Config, loader: L) -> Result<Self> {
        let catalog = QueryCatalog::new(&config.target.table)?;
        Ok(Self {
            config,
            catalog,
            loader,
        })
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Create the table and load it with the configured strategy.
    pub fn prepare(&mut self) -> Result<LoadReport> {
        let start = Instant::now();
        let strategy = self.config.load.strategy;

        self.loader.create_table_from_schema()?;
        info!("Table {} created", self.config.target.table);

        let rows_loaded = self.loader.load(strategy)?;
        let row_count = self.loader.row_count()?;
        info!(
            "Loaded {} rows into {} using the {} strategy ({} rows total)",
            rows_loaded, self.config.target.table, strategy, row_count
        );

        Ok(LoadReport {
            table: self.config.target.table.clone(),
            strategy,
            rows_loaded,
            row_count,
            duration_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Run every catalog report.
    ///
    /// A failing report is logged and recorded; the remaining reports still run.
    pub fn run_reports(&self) -> Vec<ReportResult> {
        self.catalog
            .reports()
            .into_iter()
            .map(|q| match self.loader.execute_sql(&q.sql) {
                Ok(rows) => {
                    info!("Query {} returned {} rows", q.name, rows.len());
                    ReportResult {
                        name: q.name.to_string(),
                        rows,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("Query {} failed: {}", q.name, e);
                    ReportResult {
                        name: q.name.to_string(),
                        rows: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    /// Write the per-year counts as Parquet partitioned by model year.
    ///
    /// Creates the output directory first. Partitions from an earlier export
    /// to the same directory are replaced.
    pub fn export(&self) -> Result<ExportReport> {
        let output_dir = &self.config.export.output_dir;
        std::fs::create_dir_all(output_dir)?;

        let query = self.catalog.parquet_export(output_dir)?;
        let rows = self.loader.execute_sql(&query.sql)?;
        let path = output_dir.join(EXPORT_FILE_NAME);
        info!("Exported Parquet partitions to {:?}", path);

        Ok(ExportReport { path, rows })
    }

    /// Pass-through query execution.
    pub fn query(&self, sql: &str) -> Result<Vec<Row>> {
        self.loader.execute_sql(sql)
    }

    /// Prepare, run the reports, and optionally export.
    pub fn run(&mut self, export: bool) -> Result<PipelineResult> {
        let start = Instant::now();
        let load = self.prepare()?;
        let reports = self.run_reports();
        let export = if export { Some(self.export()?) } else { None };

        Ok(PipelineResult {
            load: Some(load),
            load_error: None,
            reports,
            export,
            duration_seconds: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::SqlValue;
    use crate::error::LoadError;
    use std::cell::RefCell;

    /// Records calls and answers queries from a fixed script.
    #[derive(Default)]
    struct RecordingLoader {
        calls: RefCell<Vec<String>>,
        rows: u64,
        fail_sql_containing: Option<&'static str>,
    }

    impl TableLoader for RecordingLoader {
        fn set_file_path(&mut self, path: PathBuf) {
            self.calls.borrow_mut().push(format!("set_file_path {:?}", path));
        }

        fn create_table_from_schema(&self) -> Result<()> {
            self.calls.borrow_mut().push("create".into());
            Ok(())
        }

        fn bulk_load(&mut self) -> Result<u64> {
            self.calls.borrow_mut().push("bulk".into());
            Ok(self.rows)
        }

        fn manual_load(&mut self) -> Result<u64> {
            self.calls.borrow_mut().push("manual".into());
            Ok(self.rows)
        }

        fn transform_load(&mut self) -> Result<u64> {
            self.calls.borrow_mut().push("transform".into());
            Ok(self.rows)
        }

        fn clear_table(&self) -> Result<u64> {
            self.calls.borrow_mut().push("clear".into());
            Ok(0)
        }

        fn execute_sql(&self, query: &str) -> Result<Vec<Row>> {
            self.calls.borrow_mut().push("execute".into());
            match self.fail_sql_containing {
                Some(needle) if query.contains(needle) => {
                    Err(LoadError::Config(format!("scripted failure on {}", needle)))
                }
                _ => Ok(vec![vec![SqlValue::Int(1)]]),
            }
        }

        fn row_count(&self) -> Result<i64> {
            Ok(self.rows as i64)
        }

        fn db_type(&self) -> &str {
            "recording"
        }
    }

    fn config(strategy: LoadStrategy) -> Config {
        let mut config = Config::for_file("ev.csv");
        config.load.strategy = strategy;
        config
    }

    #[test]
    fn test_prepare_uses_configured_strategy() {
        let loader = RecordingLoader {
            rows: 2,
            ..Default::default()
        };
        let mut pipeline = Pipeline::with_loader(config(LoadStrategy::Bulk), loader).unwrap();
        let report = pipeline.prepare().unwrap();

        assert_eq!(report.rows_loaded, 2);
        assert_eq!(report.row_count, 2);
        assert_eq!(report.strategy, LoadStrategy::Bulk);
        assert_eq!(*pipeline.loader().calls.borrow(), vec!["create", "bulk"]);
    }

    #[test]
    fn test_prepare_dispatches_transform() {
        let mut pipeline =
            Pipeline::with_loader(config(LoadStrategy::Transform), RecordingLoader::default())
                .unwrap();
        pipeline.prepare().unwrap();
        assert_eq!(*pipeline.loader().calls.borrow(), vec!["create", "transform"]);
    }

    #[test]
    fn test_reload_clears_then_loads_manually() {
        let mut loader = RecordingLoader::default();
        loader.reload_data().unwrap();
        assert_eq!(*loader.calls.borrow(), vec!["clear", "manual"]);
    }

    #[test]
    fn test_failed_report_does_not_stop_the_rest() {
        let loader = RecordingLoader {
            fail_sql_containing: Some("LIMIT 3"),
            ..Default::default()
        };
        let pipeline = Pipeline::with_loader(config(LoadStrategy::Manual), loader).unwrap();
        let reports = pipeline.run_reports();

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[1].name, "top_vehicles");
        assert!(reports[1].error.is_some());
        assert!(reports[1].rows.is_empty());
        assert!(reports.iter().filter(|r| r.error.is_none()).count() == 3);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let loader = RecordingLoader {
            rows: 5,
            ..Default::default()
        };
        let mut pipeline = Pipeline::with_loader(config(LoadStrategy::Manual), loader).unwrap();
        let result = pipeline.run(false).unwrap();
        let json = result.to_json().unwrap();

        assert!(json.contains("\"strategy\": \"manual\""));
        assert!(json.contains("\"rows_loaded\": 5"));
        assert!(!json.contains("\"export\""));
        assert!(!json.contains("\"load_error\""));
    }
}
