//! Error types for the loader library.

use thiserror::Error;

/// Exit code for configuration errors (invalid YAML, missing fields, etc.).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for schema registry errors.
pub const EXIT_SCHEMA_ERROR: u8 = 2;
/// Exit code for database errors (DDL, queries, export).
pub const EXIT_DATABASE_ERROR: u8 = 3;
/// Exit code for failed loads.
pub const EXIT_LOAD_ERROR: u8 = 4;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for loader operations.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema registry is malformed (duplicate columns, no location column, ...)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Database error surfaced unchanged from the engine
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Loading data into a table failed
    #[error("Load failed for table {table}: {message}")]
    Load { table: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    /// Create a Load error
    pub fn load(table: impl Into<String>, message: impl Into<String>) -> Self {
        LoadError::Load {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            LoadError::Config(_) | LoadError::Yaml(_) => EXIT_CONFIG_ERROR,
            LoadError::Schema(_) => EXIT_SCHEMA_ERROR,
            LoadError::Database(_) | LoadError::Json(_) => EXIT_DATABASE_ERROR,
            LoadError::Load { .. } | LoadError::Csv(_) => EXIT_LOAD_ERROR,
            LoadError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
