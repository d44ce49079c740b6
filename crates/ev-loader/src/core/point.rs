//! `POINT (<lon> <lat>)` text parsing.
//!
//! The dataset stores vehicle locations as WKT-like text with longitude
//! first. Everywhere a pair is stored downstream the order is
//! (latitude, longitude), so the parser swaps the captures.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Location pattern: capture 1 is the longitude, capture 2 the latitude.
///
/// Unanchored, so prefixed text such as `SRID=4326;POINT (1 2)` still
/// matches. Also used verbatim by the engine-side load, so it must stay
/// within the syntax both `regex` and DuckDB's `regexp_extract` accept.
pub const POINT_PATTERN: &str = r"POINT\s*\(\s*([\d.\-]+)\s+([\d.\-]+)\s*\)";

static POINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(POINT_PATTERN).expect("valid point pattern"));

/// A geographic point. Both components are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

/// Parse a location string into a point.
///
/// Returns `None` for absent, empty, or malformed input, or when either
/// coordinate fails numeric coercion. A point is never half-populated.
///
/// ```
/// use ev_loader::core::point::parse_point;
///
/// let p = parse_point(Some("POINT (-122.30839 47.610365)")).unwrap();
/// assert_eq!(p.lat, 47.610365);
/// assert_eq!(p.lon, -122.30839);
/// ```
pub fn parse_point(raw: Option<&str>) -> Option<Point> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }

    let caps = POINT_RE.captures(raw)?;
    let lon = coerce(caps.get(1)?.as_str());
    let lat = coerce(caps.get(2)?.as_str());

    match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Point { lat, lon }),
        _ => None,
    }
}

/// Each capture is coerced on its own; `[\d.\-]+` admits strings like
/// `1.2.3` or `--` that are not numbers.
fn coerce(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swaps_text_order() {
        let p = parse_point(Some("POINT (-120.56916 46.58514)")).unwrap();
        assert_eq!(p.lat, 46.58514);
        assert_eq!(p.lon, -120.56916);
    }

    #[test]
    fn test_no_space_before_paren() {
        // Text order is kept as-is: the first number is always the longitude.
        let p = parse_point(Some("POINT(46.58514 -120.56916)")).unwrap();
        assert_eq!(p.lat, -120.56916);
        assert_eq!(p.lon, 46.58514);
    }

    #[test]
    fn test_whitespace_tolerant() {
        let p = parse_point(Some("  POINT (  -117.16171   32.71568 )  ")).unwrap();
        assert_eq!(p.lat, 32.71568);
        assert_eq!(p.lon, -117.16171);
    }

    #[test]
    fn test_integer_coordinates() {
        let p = parse_point(Some("POINT (10 20)")).unwrap();
        assert_eq!((p.lat, p.lon), (20.0, 10.0));
    }

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(parse_point(None), None);
        assert_eq!(parse_point(Some("")), None);
        assert_eq!(parse_point(Some("   ")), None);
    }

    #[test]
    fn test_requires_parentheses() {
        assert_eq!(parse_point(Some("POINT -120.5 46.5")), None);
        assert_eq!(parse_point(Some("POINT (-120.5 46.5")), None);
    }

    #[test]
    fn test_rejects_wrong_keyword_and_arity() {
        assert_eq!(parse_point(Some("LINESTRING (1 2)")), None);
        assert_eq!(parse_point(Some("POINT (1)")), None);
        assert_eq!(parse_point(Some("POINT (1 2 3)")), None);
    }

    #[test]
    fn test_matches_inside_surrounding_text() {
        let p = parse_point(Some("SRID=4326;POINT (1 2)")).unwrap();
        assert_eq!((p.lat, p.lon), (2.0, 1.0));
    }

    #[test]
    fn test_one_bad_coordinate_nulls_the_pair() {
        assert_eq!(parse_point(Some("POINT (1.2.3 46.5)")), None);
        assert_eq!(parse_point(Some("POINT (-120.5 --)")), None);
    }
}
