//! Configuration type definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::schema::Column;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input CSV configuration.
    pub source: SourceConfig,

    /// Target database and table.
    #[serde(default)]
    pub target: TargetConfig,

    /// Load behavior.
    #[serde(default)]
    pub load: LoadConfig,

    /// Parquet export.
    #[serde(default)]
    pub export: ExportConfig,

    /// Schema override. Empty means the built-in vehicle schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<Column>,
}

impl Config {
    /// Configuration with defaults for everything except the input file.
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: SourceConfig {
                path: path.into(),
                delimiter: default_delimiter(),
            },
            target: TargetConfig::default(),
            load: LoadConfig::default(),
            export: ExportConfig::default(),
            schema: Vec::new(),
        }
    }
}

/// Input CSV configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the CSV file.
    pub path: PathBuf,

    /// Field delimiter (default: ",").
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Target database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// DuckDB database path (default: ":memory:").
    #[serde(default = "default_database")]
    pub database: String,

    /// Target table name (default: "ev_population").
    #[serde(default = "default_table")]
    pub table: String,

    /// Install and load the spatial extension (default: true).
    ///
    /// When disabled the location column is stored as
    /// `STRUCT(x DOUBLE, y DOUBLE)`.
    #[serde(default = "default_true")]
    pub spatial_extension: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            table: default_table(),
            spatial_extension: true,
        }
    }
}

impl TargetConfig {
    /// Whether the database lives only for the connection's lifetime.
    pub fn is_in_memory(&self) -> bool {
        self.database == ":memory:" || self.database.is_empty()
    }
}

/// Load behavior configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Loading strategy (default: manual).
    #[serde(default)]
    pub strategy: LoadStrategy,

    /// Rows per INSERT statement for the manual path.
    /// Unset means one statement for the whole file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_rows: Option<usize>,
}

/// Parquet export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output directory (default: "data/output").
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// How rows get from the CSV file into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    /// Engine-native `COPY ... FROM` in one call.
    Bulk,

    /// Application-side parse, normalize, and multi-row INSERT.
    #[default]
    Manual,

    /// Engine-side parse: one `INSERT ... SELECT` over `read_csv` that
    /// rebuilds the location from its text.
    Transform,
}

impl std::fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStrategy::Bulk => f.write_str("bulk"),
            LoadStrategy::Manual => f.write_str("manual"),
            LoadStrategy::Transform => f.write_str("transform"),
        }
    }
}

impl std::str::FromStr for LoadStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bulk" => Ok(LoadStrategy::Bulk),
            "manual" => Ok(LoadStrategy::Manual),
            "transform" => Ok(LoadStrategy::Transform),
            other => Err(format!(
                "unknown load strategy '{}' (expected bulk, manual or transform)",
                other
            )),
        }
    }
}

// Default value functions for serde
fn default_delimiter() -> char {
    ','
}

fn default_database() -> String {
    ":memory:".to_string()
}

fn default_table() -> String {
    "ev_population".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_true() -> bool {
    true
}
