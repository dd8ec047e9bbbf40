//! Geometry drawn around a site on a map.

use crate::{
    geodesic::{destination_point, Cardinal, RING_RADII_M},
    GeoPoint,
};
use geo::geometry::{Coord, LineString, Polygon};

/// Default number of segments of a circle.
pub const CIRCLE_STEPS: usize = 72;

/// Half length of the N-S and W-E cross lines, meters.
pub const CROSS_HALF_LENGTH_M: f64 = 1100.0;

/// Returns a closed polygon approximating the circle of `radius_m`
/// around `center`, with vertices at bearings `i * 360 / steps`.
pub fn circle_polygon(center: GeoPoint, radius_m: f64, steps: usize) -> Polygon<f64> {
    let steps = steps.max(3);
    let mut ring: Vec<Coord<f64>> = (0..steps)
        .map(|i| {
            let bearing = i as f64 * 360.0 / steps as f64;
            destination_point(center, bearing, radius_m).into()
        })
        .collect();
    ring.push(ring[0]);
    Polygon::new(LineString::new(ring), Vec::new())
}

/// Returns the south to north and west to east lines through
/// `center`, each extending `half_length_m` on both sides.
pub fn cross_lines(center: GeoPoint, half_length_m: f64) -> (LineString<f64>, LineString<f64>) {
    let end = |direction: Cardinal| -> Coord<f64> {
        destination_point(center, direction.bearing_deg(), half_length_m).into()
    };
    let ns = LineString::new(vec![end(Cardinal::South), end(Cardinal::North)]);
    let ew = LineString::new(vec![end(Cardinal::West), end(Cardinal::East)]);
    (ns, ew)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteOverlays {
    /// `(radius_m, circle)`, innermost first.
    pub circles: Vec<(f64, Polygon<f64>)>,
    pub north_south: LineString<f64>,
    pub west_east: LineString<f64>,
}

/// Returns the sampling circles and the cross through `center`.
pub fn site_overlays(center: GeoPoint) -> SiteOverlays {
    let circles = RING_RADII_M
        .iter()
        .map(|&radius| (radius, circle_polygon(center, radius, CIRCLE_STEPS)))
        .collect();
    let (north_south, west_east) = cross_lines(center, CROSS_HALF_LENGTH_M);
    SiteOverlays {
        circles,
        north_south,
        west_east,
    }
}
