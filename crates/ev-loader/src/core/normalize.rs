//! Raw CSV record to typed row conversion.

use csv::StringRecord;

use super::point::{parse_point, Point};
use super::schema::SchemaRegistry;

/// One normalized record.
///
/// `values` follows registry order with the location column removed; the
/// location pair always comes last regardless of where the location column
/// sits in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub values: Vec<Option<String>>,
    pub location: Option<Point>,
}

impl NormalizedRow {
    /// Number of fields, counting latitude and longitude separately.
    pub fn width(&self) -> usize {
        self.values.len() + 2
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|p| p.lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|p| p.lon)
    }
}

/// Converts CSV records into [`NormalizedRow`]s for one header layout.
///
/// Header positions are resolved once at construction. Registry columns
/// missing from the header normalize to null.
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    value_positions: Vec<Option<usize>>,
    location_position: Option<usize>,
}

impl RowNormalizer {
    pub fn new(schema: &SchemaRegistry, headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|h| h == name);

        Self {
            value_positions: schema.value_columns().map(|c| position(&c.name)).collect(),
            location_position: position(&schema.location().name),
        }
    }

    /// Number of registry columns the header does not provide.
    pub fn missing_columns(&self) -> usize {
        self.value_positions.iter().filter(|p| p.is_none()).count()
            + usize::from(self.location_position.is_none())
    }

    /// Normalize one record.
    ///
    /// Empty or absent fields become `None`; everything else passes through
    /// unchanged. Numeric columns are not validated here.
    pub fn normalize(&self, record: &StringRecord) -> NormalizedRow {
        let field = |pos: Option<usize>| pos.and_then(|p| record.get(p));

        let values = self
            .value_positions
            .iter()
            .map(|pos| match field(*pos) {
                None | Some("") => None,
                Some(v) => Some(v.to_string()),
            })
            .collect();

        NormalizedRow {
            values,
            location: parse_point(field(self.location_position)),
        }
    }
}
