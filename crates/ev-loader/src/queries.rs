//! Fixed analytic queries over the vehicle table.
//!
//! Query text is built from the configured table name and export directory
//! instead of process-wide constants.

use std::path::Path;

use crate::core::identifier::{quote_ident, quote_literal};
use crate::error::{LoadError, Result};

/// File name of the partitioned Parquet export inside the output directory.
pub const EXPORT_FILE_NAME: &str = "electric_car_count.parquet";

/// Column the Parquet export is partitioned by.
pub const EXPORT_PARTITION_COLUMN: &str = "Model Year";

/// A named query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: &'static str,
    pub sql: String,
}

/// Query texts for one table.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    table: String,
}

impl QueryCatalog {
    pub fn new(table: &str) -> Result<Self> {
        Ok(Self {
            table: quote_ident(table)?,
        })
    }

    /// Electric cars per city, most first.
    pub fn count_by_city(&self) -> NamedQuery {
        NamedQuery {
            name: "count_by_city",
            sql: format!(
                "SELECT \"City\", COUNT(*) AS electric_car_count\n\
                 FROM {}\n\
                 GROUP BY \"City\"\n\
                 ORDER BY electric_car_count DESC",
                self.table
            ),
        }
    }

    /// The three most common make/model pairs.
    pub fn top_vehicles(&self) -> NamedQuery {
        NamedQuery {
            name: "top_vehicles",
            sql: format!(
                "SELECT \"Make\", \"Model\", COUNT(*) AS vehicle_count\n\
                 FROM {}\n\
                 GROUP BY \"Make\", \"Model\"\n\
                 ORDER BY vehicle_count DESC\n\
                 LIMIT 3",
                self.table
            ),
        }
    }

    /// The most common make/model per postal code.
    pub fn most_popular_by_postal_code(&self) -> NamedQuery {
        NamedQuery {
            name: "most_popular_by_postal_code",
            sql: format!(
                "WITH ranked AS (\n    \
                     SELECT \"Postal Code\", \"Make\", \"Model\",\n           \
                            COUNT(*) AS vehicle_count,\n           \
                            ROW_NUMBER() OVER (PARTITION BY \"Postal Code\" ORDER BY COUNT(*) DESC) AS rank\n    \
                     FROM {}\n    \
                     GROUP BY \"Postal Code\", \"Make\", \"Model\"\n\
                 )\n\
                 SELECT \"Postal Code\", \"Make\", \"Model\", vehicle_count\n\
                 FROM ranked\n\
                 WHERE rank = 1\n\
                 ORDER BY \"Postal Code\"",
                self.table
            ),
        }
    }

    /// Electric cars per model year.
    pub fn count_by_year(&self) -> NamedQuery {
        NamedQuery {
            name: "count_by_year",
            sql: format!(
                "SELECT \"Model Year\", COUNT(*) AS electric_car_count\n\
                 FROM {}\n\
                 GROUP BY \"Model Year\"\n\
                 ORDER BY \"Model Year\"",
                self.table
            ),
        }
    }

    /// `count_by_year` written as Parquet, partitioned by model year.
    ///
    /// The output directory must exist before the statement runs.
    pub fn parquet_export(&self, output_dir: &Path) -> Result<NamedQuery> {
        let target = output_dir.join(EXPORT_FILE_NAME);
        let target = target.to_str().ok_or_else(|| {
            LoadError::Config(format!("export path is not valid UTF-8: {:?}", target))
        })?;

        Ok(NamedQuery {
            name: "parquet_export",
            sql: format!(
                "COPY (\n{}\n) TO {} (FORMAT PARQUET, PARTITION_BY ({}), OVERWRITE TRUE)",
                self.count_by_year().sql,
                quote_literal(target)?,
                quote_ident(EXPORT_PARTITION_COLUMN)?
            ),
        })
    }

    /// The analytic reports, in the order they are run.
    pub fn reports(&self) -> Vec<NamedQuery> {
        vec![
            self.count_by_city(),
            self.top_vehicles(),
            self.most_popular_by_postal_code(),
            self.count_by_year(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_use_quoted_table() {
        let catalog = QueryCatalog::new("ev_population").unwrap();
        for q in catalog.reports() {
            assert!(q.sql.contains("FROM \"ev_population\""), "{}", q.name);
        }
    }

    #[test]
    fn test_report_order() {
        let names: Vec<_> = QueryCatalog::new("t")
            .unwrap()
            .reports()
            .into_iter()
            .map(|q| q.name)
            .collect();
        assert_eq!(
            names,
            ["count_by_city", "top_vehicles", "most_popular_by_postal_code", "count_by_year"]
        );
    }

    #[test]
    fn test_parquet_export_statement() {
        let catalog = QueryCatalog::new("ev_population").unwrap();
        let q = catalog.parquet_export(Path::new("data/output")).unwrap();
        assert!(q.sql.starts_with("COPY (\nSELECT \"Model Year\""));
        assert!(q.sql.contains("TO 'data/output/electric_car_count.parquet'"));
        assert!(q.sql.contains("PARTITION_BY (\"Model Year\")"));
        assert!(q.sql.ends_with("OVERWRITE TRUE)"));
    }

    #[test]
    fn test_rejects_empty_table() {
        assert!(QueryCatalog::new("").is_err());
    }
}
