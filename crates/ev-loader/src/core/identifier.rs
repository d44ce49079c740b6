//! Identifier validation and quoting for generated DuckDB statements.
//!
//! Table and column names cannot be bound as parameters, and neither can the
//! file paths used by `COPY ... FROM` / `COPY ... TO`. Those pieces are
//! inlined into statement text, so every one of them goes through this
//! module:
//!
//! 1. Identifiers are validated (empty, null bytes, excessive length)
//! 2. Identifiers are wrapped in double quotes with embedded quotes doubled
//! 3. String literals are wrapped in single quotes with embedded quotes doubled
//!
//! Column names in the vehicle dataset contain spaces and parentheses
//! (`"VIN (1-10)"`, `"2020 Census Tract"`), so quoting is mandatory rather
//! than cosmetic.

use crate::error::{LoadError, Result};

/// Maximum identifier length accepted in a schema registry or table name.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `LoadError::Config` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LoadError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(LoadError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(LoadError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a DuckDB identifier.
///
/// Escapes double quotes by doubling them and wraps in double quotes.
/// Validates the identifier before quoting.
///
/// # Examples
///
/// ```
/// use ev_loader::core::identifier::quote_ident;
///
/// assert_eq!(quote_ident("City").unwrap(), "\"City\"");
/// assert_eq!(quote_ident("VIN (1-10)").unwrap(), "\"VIN (1-10)\"");
/// ```
pub fn quote_ident(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote a string literal (file paths, export targets).
///
/// Single quotes are doubled. Null bytes are rejected since DuckDB would
/// truncate the statement at them.
pub fn quote_literal(value: &str) -> Result<String> {
    if value.contains('\0') {
        return Err(LoadError::Config(format!(
            "String literal contains null byte: {:?}",
            value
        )));
    }
    Ok(format!("'{}'", value.replace('\'', "''")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("ev_population").is_ok());
        assert!(validate_identifier("Vehicle Location").is_ok());
        assert!(validate_identifier("2020 Census Tract").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        let err = validate_identifier("").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        assert!(validate_identifier("City\0; DROP TABLE x").is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_too_long() {
        let name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(validate_identifier(&name).is_err());
    }

    #[test]
    fn test_validate_identifier_accepts_max_length() {
        let name = "a".repeat(MAX_IDENTIFIER_LENGTH);
        assert!(validate_identifier(&name).is_ok());
    }

    #[test]
    fn test_quote_ident_escapes_double_quote() {
        assert_eq!(quote_ident("my\"col").unwrap(), "\"my\"\"col\"");
    }

    #[test]
    fn test_quote_ident_injection_safely_quoted() {
        let quoted = quote_ident("x\"; DROP TABLE ev_population; --").unwrap();
        assert_eq!(quoted, "\"x\"\"; DROP TABLE ev_population; --\"");
    }

    #[test]
    fn test_quote_literal_doubles_single_quotes() {
        assert_eq!(
            quote_literal("data/O'Brien's.csv").unwrap(),
            "'data/O''Brien''s.csv'"
        );
    }

    #[test]
    fn test_quote_literal_rejects_null_byte() {
        assert!(quote_literal("data\0.csv").is_err());
    }
}
