use crate::{geodesic::normalize_lon, OrographyError};
use geo::geometry::{Coord, Point};
use serde::Serialize;

/// A WGS84 location in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns a point after checking that both values are finite and
    /// within geographic range.
    pub fn validated(lat: f64, lon: f64) -> Result<Self, OrographyError> {
        if !lat.is_finite() {
            return Err(OrographyError::InvalidNumber("latitude"));
        }
        if !lon.is_finite() {
            return Err(OrographyError::InvalidNumber("longitude"));
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(OrographyError::InvalidRange { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Same as `validated`, but wraps an out of range longitude first.
    pub(crate) fn normalized(lat: f64, lon: f64) -> Result<Self, OrographyError> {
        Self::validated(lat, normalize_lon(lon))
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(GeoPoint { lat, lon }: GeoPoint) -> Self {
        Coord { x: lon, y: lat }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(Coord { x, y }: Coord<f64>) -> Self {
        Self { lat: y, lon: x }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point(point.into())
    }
}

/// Planar coordinates in a projected coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub crs: String,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64, crs: impl Into<String>) -> Self {
        Self {
            x,
            y,
            crs: crs.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, GeoPoint};
    use crate::OrographyError;

    #[test]
    fn test_validated() {
        assert!(GeoPoint::validated(50.8503, 4.3517).is_ok());
        assert!(GeoPoint::validated(-90.0, 180.0).is_ok());
        assert!(matches!(
            GeoPoint::validated(95.0, 10.0),
            Err(OrographyError::InvalidRange { .. })
        ));
        assert!(matches!(
            GeoPoint::validated(10.0, -180.5),
            Err(OrographyError::InvalidRange { .. })
        ));
        assert!(matches!(
            GeoPoint::validated(f64::NAN, 10.0),
            Err(OrographyError::InvalidNumber("latitude"))
        ));
        assert!(matches!(
            GeoPoint::validated(10.0, f64::INFINITY),
            Err(OrographyError::InvalidNumber("longitude"))
        ));
    }

    #[test]
    fn test_normalized_wraps_longitude() {
        let point = GeoPoint::normalized(10.0, 190.0).unwrap();
        assert!((point.lon - -170.0).abs() < 1e-12);
    }

    #[test]
    fn test_coord_axis_order() {
        let coord = Coord::from(GeoPoint::new(50.0, 4.0));
        assert_eq!(coord, Coord { x: 4.0, y: 50.0 });
        assert_eq!(GeoPoint::from(coord), GeoPoint::new(50.0, 4.0));
    }
}
