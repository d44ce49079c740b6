//! Configuration validation.

use super::Config;
use crate::core::identifier::validate_identifier;
use crate::core::schema::SchemaRegistry;
use crate::error::{LoadError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.path.as_os_str().is_empty() {
        return Err(LoadError::Config("source.path is required".into()));
    }
    if !config.source.delimiter.is_ascii() || config.source.delimiter == '"' {
        return Err(LoadError::Config(format!(
            "source.delimiter must be a single ASCII character other than '\"', got {:?}",
            config.source.delimiter
        )));
    }

    // Target validation
    validate_identifier(&config.target.table)
        .map_err(|e| LoadError::Config(format!("target.table: {}", e)))?;

    // Load validation - only check if explicitly set
    if let Some(0) = config.load.batch_rows {
        return Err(LoadError::Config(
            "load.batch_rows must be at least 1".into(),
        ));
    }

    if config.export.output_dir.as_os_str().is_empty() {
        return Err(LoadError::Config("export.output_dir is required".into()));
    }

    if !config.schema.is_empty() {
        SchemaRegistry::new(config.schema.clone())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Column, ColumnType};

    fn valid_config() -> Config {
        Config::for_file("data/Electric_Vehicle_Population_Data.csv")
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_source_path() {
        let mut config = valid_config();
        config.source.path = "".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_ascii_delimiter() {
        let mut config = valid_config();
        config.source.delimiter = '§';
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_table_name() {
        let mut config = valid_config();
        config.target.table = "".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("target.table"));
    }

    #[test]
    fn test_zero_batch_rows() {
        let mut config = valid_config();
        config.load.batch_rows = Some(0);
        assert!(validate(&config).is_err());

        config.load.batch_rows = Some(500);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_schema_override_without_location() {
        let mut config = valid_config();
        config.schema = vec![Column::new("City", ColumnType::Varchar(Some(50)))];
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, LoadError::Schema(_)));
    }
}
