//! Orography factor.

use crate::OrographyError;
use serde::Serialize;
use std::fmt;

/// Tower height used when none, or a non-finite one, is supplied.
pub const DEFAULT_TOWER_HEIGHT_M: f64 = 30.0;

/// Factor above which a site is no longer considered flat.
const FLAT_LIMIT: f64 = 1.0;

/// Factor above which a detailed analysis is required.
const SEVERE_LIMIT: f64 = 1.15;

/// Terrain elevations (meters) around a site.
///
/// Ring arrays are ordered north, east, south, west.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Elevations {
    pub center: f64,
    pub ring_500m: [f64; 4],
    pub ring_1000m: [f64; 4],
}

impl Elevations {
    fn all_finite(&self) -> bool {
        std::iter::once(&self.center)
            .chain(&self.ring_500m)
            .chain(&self.ring_1000m)
            .all(|e| e.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Standard pieces may be used.
    Flat,
    /// An individual stability study is needed.
    NotFlat,
    /// A detailed analysis and an individual stability study are
    /// needed.
    Severe,
}

impl Classification {
    pub fn from_factor(factor: f64) -> Self {
        if factor <= FLAT_LIMIT {
            Self::Flat
        } else if factor <= SEVERE_LIMIT {
            Self::NotFlat
        } else {
            Self::Severe
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Flat => "Site is considered flat. Standard pieces may be used",
            Self::NotFlat => {
                "Site is NOT flat. Standard pieces may not be used without an individual stability study."
            }
            Self::Severe => {
                "Site is NOT flat. A detailed analysis is required. Standard pieces may not be used without an individual stability study."
            }
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orography {
    /// Weighted mean elevation of the site's surroundings (`Am`).
    pub mean_elevation_m: f64,
    /// Site elevation relative to `mean_elevation_m` (`ΔAc`).
    pub relative_elevation_m: f64,
    /// Orography factor, rounded up to 2 decimals.
    pub factor: f64,
    pub classification: Classification,
}

/// Returns `height_m`, or the default tower height if it is absent or
/// not finite.
pub fn tower_height_or_default(height_m: Option<f64>) -> f64 {
    height_m
        .filter(|h| h.is_finite())
        .unwrap_or(DEFAULT_TOWER_HEIGHT_M)
}

/// Computes the orography factor for a structure of `tower_height_m`.
///
/// Fails with `IncompleteSamples` unless all 9 elevations are finite.
pub fn compute(elevations: &Elevations, tower_height_m: f64) -> Result<Orography, OrographyError> {
    if !elevations.all_finite() {
        return Err(OrographyError::IncompleteSamples);
    }

    let sum_500m: f64 = elevations.ring_500m.iter().sum();
    let sum_1000m: f64 = elevations.ring_1000m.iter().sum();
    let mean_elevation_m = (2.0 * elevations.center + sum_1000m + sum_500m) / 10.0;
    let relative_elevation_m = elevations.center - mean_elevation_m;

    let raw = if tower_height_m > 10.0 {
        1.0 + 0.004 * relative_elevation_m * (-0.014 * (tower_height_m - 10.0)).exp()
    } else {
        1.0 + 0.004 * relative_elevation_m
    };
    let factor = ceil_hundredths(raw);

    Ok(Orography {
        mean_elevation_m,
        relative_elevation_m,
        factor,
        classification: Classification::from_factor(factor),
    })
}

/// Rounds up to 2 decimals, ignoring float noise just above a whole
/// hundredth.
fn ceil_hundredths(value: f64) -> f64 {
    const NOISE: f64 = 1e-9;
    ((value * 100.0) - NOISE).ceil() / 100.0
}
