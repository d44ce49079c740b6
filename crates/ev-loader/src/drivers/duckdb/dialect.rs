//! DuckDB statement text for the loader.
//!
//! Identifiers and file paths are inlined (quoted through
//! [`crate::core::identifier`]); row values are always bound parameters.

use duckdb::types::Value;

use crate::core::identifier::{quote_ident, quote_literal};
use crate::core::normalize::NormalizedRow;
use crate::core::point::POINT_PATTERN;
use crate::core::schema::{PointEncoding, SchemaRegistry};
use crate::error::Result;

/// `COPY "<table>" FROM '<path>' (FORMAT CSV, HEADER TRUE, DELIMITER '<d>')`.
pub fn copy_from_sql(table: &str, path: &str, delimiter: char) -> Result<String> {
    Ok(format!(
        "COPY {} FROM {} (FORMAT CSV, HEADER TRUE, DELIMITER {})",
        quote_ident(table)?,
        quote_literal(path)?,
        quote_literal(&delimiter.to_string())?
    ))
}

/// `DELETE FROM "<table>"`.
pub fn delete_all_sql(table: &str) -> Result<String> {
    Ok(format!("DELETE FROM {}", quote_ident(table)?))
}

/// `SELECT COUNT(*) FROM "<table>"`.
pub fn count_sql(table: &str) -> Result<String> {
    Ok(format!("SELECT COUNT(*) FROM {}", quote_ident(table)?))
}

/// Single-statement load that parses the file inside the engine.
///
/// Reads every field as text through `read_csv`, casts the value columns to
/// their declared types, and rebuilds the location from `POINT (<lon> <lat>)`
/// text with [`POINT_PATTERN`]. Empty fields load as NULL. A location whose
/// coordinates do not both coerce to numbers loads as NULL, same as the
/// application-side parser.
pub fn transform_insert_sql(
    table: &str,
    schema: &SchemaRegistry,
    encoding: PointEncoding,
    path: &str,
    delimiter: char,
) -> Result<String> {
    let location = quote_ident(&schema.location().name)?;
    let pattern = quote_literal(POINT_PATTERN)?;

    let mut targets = Vec::with_capacity(schema.len());
    let mut selects = Vec::with_capacity(schema.len());
    for col in schema.value_columns() {
        let name = quote_ident(&col.name)?;
        selects.push(format!("CAST(NULLIF({}, '') AS {})", name, col.column_type));
        targets.push(name);
    }
    targets.push(location.clone());
    selects.push(format!(
        "CASE WHEN point_lat IS NULL OR point_lon IS NULL THEN NULL ELSE {} END",
        encoding.point_expr("point_lat", "point_lon")
    ));

    Ok(format!(
        "INSERT INTO {table} ({targets})\n\
         SELECT {selects}\n\
         FROM (\n    \
             SELECT *,\n           \
                    TRY_CAST(regexp_extract({loc}, {pat}, 2) AS DOUBLE) AS point_lat,\n           \
                    TRY_CAST(regexp_extract({loc}, {pat}, 1) AS DOUBLE) AS point_lon\n    \
             FROM read_csv({path}, header = true, all_varchar = true, delim = {delim})\n\
         )",
        table = quote_ident(table)?,
        targets = targets.join(", "),
        selects = selects.join(", "),
        loc = location,
        pat = pattern,
        path = quote_literal(path)?,
        delim = quote_literal(&delimiter.to_string())?,
    ))
}

/// Builds multi-row `INSERT ... VALUES` statements for normalized rows.
///
/// The column list is the registry's value columns followed by the location
/// column, matching [`NormalizedRow`] layout. Each value slot is
/// `CAST(? AS <declared type>)` so malformed numeric text is rejected by the
/// engine at insert time. The location slot is `NULL` when the row has no
/// point and the encoding's point constructor otherwise.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    prefix: String,
    value_slots: String,
    point_slot: String,
}

impl InsertBuilder {
    pub fn new(table: &str, schema: &SchemaRegistry, encoding: PointEncoding) -> Result<Self> {
        let mut cols = schema
            .value_columns()
            .map(|c| quote_ident(&c.name))
            .collect::<Result<Vec<_>>>()?;
        cols.push(quote_ident(&schema.location().name)?);

        let value_slots = schema
            .value_columns()
            .map(|c| format!("CAST(? AS {})", c.column_type))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Self {
            prefix: format!(
                "INSERT INTO {} ({}) VALUES ",
                quote_ident(table)?,
                cols.join(", ")
            ),
            value_slots,
            point_slot: encoding.point_expr("?", "?"),
        })
    }

    /// Statement text and parameters for `rows`, in binding order.
    pub fn build(&self, rows: &[NormalizedRow]) -> (String, Vec<Value>) {
        let mut sql = self.prefix.clone();
        let mut params = Vec::with_capacity(rows.iter().map(NormalizedRow::width).sum());

        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            sql.push_str(&self.value_slots);
            sql.push_str(", ");

            params.extend(row.values.iter().map(|v| match v {
                Some(s) => Value::Text(s.clone()),
                None => Value::Null,
            }));

            match row.location {
                Some(p) => {
                    sql.push_str(&self.point_slot);
                    params.push(Value::Double(p.lat));
                    params.push(Value::Double(p.lon));
                }
                None => sql.push_str("NULL"),
            }
            sql.push(')');
        }

        (sql, params)
    }
}
