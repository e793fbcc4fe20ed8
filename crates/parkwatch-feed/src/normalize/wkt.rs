//! Minimal reader for the `POLYGON ((lon lat, ...))` strings the legacy
//! endpoint attaches to each space.

use parkwatch_core::Coordinate;

/// Parse a WKT polygon's outer ring into `(lat, lon)` coordinates.
///
/// Returns an empty vector if any vertex fails to parse.
pub(super) fn parse_polygon(wkt: &str) -> Vec<Coordinate> {
    let trimmed = wkt.trim();
    let Some(body) = trimmed
        .get(..7)
        .filter(|head| head.eq_ignore_ascii_case("POLYGON"))
        .map(|_| trimmed[7..].trim())
    else {
        return Vec::new();
    };

    let ring = body
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(')')
        .next()
        .unwrap_or_default();

    let mut coords = Vec::new();
    for vertex in ring.split(',') {
        let mut parts = vertex.split_whitespace();
        let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
            return Vec::new();
        };
        match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => {
                coords.push(Coordinate::new(lat, lon));
            }
            _ => return Vec::new(),
        }
    }
    coords
}

/// Arithmetic mean of the vertices.
pub(super) fn centroid(coords: &[Coordinate]) -> Option<Coordinate> {
    if coords.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = coords.len() as f64;
    let (lat, lon) = coords
        .iter()
        .fold((0.0, 0.0), |(lat, lon), c| (lat + c.lat, lon + c.lon));
    Some(Coordinate::new(lat / n, lon / n))
}
