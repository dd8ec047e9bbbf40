//! Spherical earth geodesy.
//!
//! The earth is treated as a sphere with the WGS84 equatorial radius.
//! At the few-kilometer scale of a site assessment this is well
//! within the resolution of the elevation data.

use crate::GeoPoint;
use serde::Serialize;

/// Radius of the spherical earth model (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Sampling radii around a site (meters), inner ring first.
pub const RING_RADII_M: [f64; 2] = [500.0, 1000.0];

/// Number of ring samples in an assessment.
pub const RING_LEN: usize = RING_RADII_M.len() * Cardinal::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [Self::North, Self::East, Self::South, Self::West];

    pub fn bearing_deg(self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }
}

/// A point at a fixed bearing and radius from a site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingSample {
    pub radius_m: f64,
    pub direction: Cardinal,
    pub bearing_deg: f64,
    pub point: GeoPoint,
}

/// Returns the point reached by travelling `distance_m` from `origin`
/// along the great circle with initial bearing `bearing_deg`.
///
/// Bearings are degrees clockwise from true north and may be any real
/// value. The returned longitude lies in (-180, 180].
pub fn destination_point(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let lat2 = (sin_lat1 * cos_delta + cos_lat1 * sin_delta * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * sin_delta * cos_lat1).atan2(cos_delta - sin_lat1 * lat2.sin());

    GeoPoint {
        lat: lat2.to_degrees(),
        lon: normalize_lon(lon2.to_degrees()),
    }
}

/// Returns the sample point `radius_m` from `origin` at `bearing_deg`.
pub fn ring_point(origin: GeoPoint, bearing_deg: f64, radius_m: f64) -> GeoPoint {
    destination_point(origin, bearing_deg, radius_m)
}

/// Returns the 8 cardinal ring samples around `center`: N, E, S, W at
/// 500 m followed by N, E, S, W at 1000 m.
pub fn ring_samples(center: GeoPoint) -> [RingSample; RING_LEN] {
    std::array::from_fn(|idx| {
        let radius_m = RING_RADII_M[idx / Cardinal::ALL.len()];
        let direction = Cardinal::ALL[idx % Cardinal::ALL.len()];
        let bearing_deg = direction.bearing_deg();
        RingSample {
            radius_m,
            direction,
            bearing_deg,
            point: ring_point(center, bearing_deg, radius_m),
        }
    })
}

/// Returns the initial great circle bearing (degrees in [0, 360))
/// from `from` to `to`.
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlon = (to.lon - from.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Returns the great circle distance (meters) between two points.
pub fn distance(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.lon - from.lon).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Wraps a longitude into (-180, 180].
pub fn normalize_lon(lon: f64) -> f64 {
    if lon > -180.0 && lon <= 180.0 {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        180.0
    } else {
        wrapped
    }
}
