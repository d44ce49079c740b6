//! Schema registry for the vehicle table.
//!
//! The registry is an ordered list of columns. Order is significant: it
//! drives both the `CREATE TABLE` column order and the positional value
//! layout produced by the row normalizer. Exactly one column is declared
//! `POINT_2D`; that column is the designated location column.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

use super::identifier::quote_ident;

/// Declared column type.
///
/// Parsed from and rendered to the SQL type text used in configuration
/// files (`VARCHAR(10)`, `SMALLINT`, `POINT_2D`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    /// Variable-length text with an optional maximum length.
    Varchar(Option<u32>),
    SmallInt,
    Integer,
    BigInt,
    Double,
    /// Native 2D point; the designated location column.
    Point2D,
}

impl ColumnType {
    /// Whether this is the point type.
    pub fn is_point(&self) -> bool {
        matches!(self, ColumnType::Point2D)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Varchar(Some(n)) => write!(f, "VARCHAR({})", n),
            ColumnType::Varchar(None) => f.write_str("VARCHAR"),
            ColumnType::SmallInt => f.write_str("SMALLINT"),
            ColumnType::Integer => f.write_str("INTEGER"),
            ColumnType::BigInt => f.write_str("BIGINT"),
            ColumnType::Double => f.write_str("DOUBLE"),
            ColumnType::Point2D => f.write_str("POINT_2D"),
        }
    }
}

impl FromStr for ColumnType {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_uppercase();

        if let Some(rest) = normalized.strip_prefix("VARCHAR") {
            let rest = rest.trim();
            if rest.is_empty() {
                return Ok(ColumnType::Varchar(None));
            }
            let len = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .and_then(|n| n.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| LoadError::Schema(format!("invalid VARCHAR length in {:?}", s)))?;
            return Ok(ColumnType::Varchar(Some(len)));
        }

        match normalized.as_str() {
            "TEXT" | "STRING" => Ok(ColumnType::Varchar(None)),
            "SMALLINT" | "INT2" => Ok(ColumnType::SmallInt),
            "INTEGER" | "INT" | "INT4" => Ok(ColumnType::Integer),
            "BIGINT" | "INT8" => Ok(ColumnType::BigInt),
            "DOUBLE" | "FLOAT8" => Ok(ColumnType::Double),
            "POINT_2D" => Ok(ColumnType::Point2D),
            _ => Err(LoadError::Schema(format!("unsupported column type {:?}", s))),
        }
    }
}

impl TryFrom<String> for ColumnType {
    type Error = LoadError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.to_string()
    }
}

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, exactly as it appears in the CSV header.
    pub name: String,

    /// Declared type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// How the location column is represented in DuckDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointEncoding {
    /// `POINT_2D` from the spatial extension.
    Spatial,
    /// `STRUCT(x DOUBLE, y DOUBLE)`, the physical layout of `POINT_2D`,
    /// for connections without the spatial extension.
    Struct,
}

impl PointEncoding {
    /// Column type used in `CREATE TABLE`.
    pub fn column_type(&self) -> &'static str {
        match self {
            PointEncoding::Spatial => "POINT_2D",
            PointEncoding::Struct => "STRUCT(x DOUBLE, y DOUBLE)",
        }
    }

    /// Point constructor over two SQL expressions, latitude first.
    pub fn point_expr(&self, lat: &str, lon: &str) -> String {
        match self {
            PointEncoding::Spatial => format!("ST_Point2D({}, {})", lat, lon),
            PointEncoding::Struct => format!(
                "struct_pack(x := CAST({} AS DOUBLE), y := CAST({} AS DOUBLE))",
                lat, lon
            ),
        }
    }
}

/// Ordered column-name-to-type mapping with one designated location column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    columns: Vec<Column>,
    location_idx: usize,
}

impl SchemaRegistry {
    /// Build a registry, validating names and the location column.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(LoadError::Schema("schema has no columns".into()));
        }

        let mut seen = HashSet::new();
        for col in &columns {
            quote_ident(&col.name).map_err(|e| LoadError::Schema(e.to_string()))?;
            if !seen.insert(col.name.as_str()) {
                return Err(LoadError::Schema(format!(
                    "duplicate column {:?}",
                    col.name
                )));
            }
        }

        let points: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.column_type.is_point())
            .map(|(i, _)| i)
            .collect();

        let location_idx = match points.as_slice() {
            [idx] => *idx,
            [] => {
                return Err(LoadError::Schema(
                    "schema must declare exactly one POINT_2D location column, found none".into(),
                ))
            }
            _ => {
                return Err(LoadError::Schema(format!(
                    "schema must declare exactly one POINT_2D location column, found {}",
                    points.len()
                )))
            }
        };

        Ok(Self {
            columns,
            location_idx,
        })
    }

    /// The Electric Vehicle Population dataset schema.
    pub fn vehicle() -> Self {
        use ColumnType::*;

        let columns = vec![
            Column::new("VIN (1-10)", Varchar(Some(10))),
            Column::new("County", Varchar(Some(50))),
            Column::new("City", Varchar(Some(50))),
            Column::new("State", Varchar(Some(2))),
            Column::new("Postal Code", Varchar(Some(10))),
            Column::new("Model Year", SmallInt),
            Column::new("Make", Varchar(Some(50))),
            Column::new("Model", Varchar(Some(50))),
            Column::new("Electric Vehicle Type", Varchar(Some(50))),
            Column::new(
                "Clean Alternative Fuel Vehicle (CAFV) Eligibility",
                Varchar(Some(100)),
            ),
            Column::new("Electric Range", SmallInt),
            Column::new("Base MSRP", BigInt),
            Column::new("Legislative District", SmallInt),
            Column::new("DOL Vehicle ID", BigInt),
            Column::new("Vehicle Location", Point2D),
            Column::new("Electric Utility", Varchar(Some(50))),
            Column::new("2020 Census Tract", BigInt),
        ];

        Self {
            columns,
            location_idx: 14,
        }
    }

    /// All columns in registry order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The designated location column.
    pub fn location(&self) -> &Column {
        &self.columns[self.location_idx]
    }

    /// Non-location columns in registry order.
    pub fn value_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.location_idx)
            .map(|(_, c)| c)
    }

    /// Number of columns, location included.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false; a registry has at least the location column.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build the `CREATE TABLE IF NOT EXISTS` statement in registry order.
    pub fn create_table_sql(&self, table: &str, encoding: PointEncoding) -> Result<String> {
        let col_defs = self
            .columns
            .iter()
            .map(|c| {
                let ty = if c.column_type.is_point() {
                    encoding.column_type().to_string()
                } else {
                    c.column_type.to_string()
                };
                Ok(format!("{} {}", quote_ident(&c.name)?, ty))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            quote_ident(table)?,
            col_defs.join(",\n    ")
        ))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::vehicle()
    }
}
