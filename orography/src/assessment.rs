use crate::{
    calculator::{compute, tower_height_or_default, Elevations, Orography},
    geodesic::{ring_samples, Cardinal, RingSample, RING_LEN},
    GeoPoint,
};
use log::{debug, info, warn};
use serde::Serialize;

/// State of a single elevation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "meters")]
pub enum Elevation {
    Pending,
    Meters(f64),
    Unavailable,
}

impl Elevation {
    /// Returns the elevation if it is known and finite.
    pub fn meters(self) -> Option<f64> {
        match self {
            Self::Meters(m) if m.is_finite() => Some(m),
            _ => None,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationSample {
    pub point: GeoPoint,
    pub elevation: Elevation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingElevation {
    #[serde(flatten)]
    pub sample: RingSample,
    pub elevation: Elevation,
}

/// Identifies one of the 9 lookups of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Center,
    /// Index into [SiteAssessment::ring].
    Ring(usize),
}

/// Elevation sampling state around a single resolved site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteAssessment {
    /// Resolution generation which created this assessment.
    pub generation: u64,
    pub center: ElevationSample,
    pub ring: [RingElevation; RING_LEN],
    pub tower_height_m: f64,
    /// Set once, when all 9 elevations are known.
    pub orography: Option<Orography>,
}

impl SiteAssessment {
    pub fn new(generation: u64, center: GeoPoint, tower_height_m: Option<f64>) -> Self {
        let ring = ring_samples(center).map(|sample| RingElevation {
            sample,
            elevation: Elevation::Pending,
        });
        Self {
            generation,
            center: ElevationSample {
                point: center,
                elevation: Elevation::Pending,
            },
            ring,
            tower_height_m: tower_height_or_default(tower_height_m),
            orography: None,
        }
    }

    /// Returns every lookup this assessment needs, center first.
    pub fn lookups(&self) -> Vec<(Slot, GeoPoint)> {
        std::iter::once((Slot::Center, self.center.point))
            .chain(
                self.ring
                    .iter()
                    .enumerate()
                    .map(|(idx, ring)| (Slot::Ring(idx), ring.sample.point)),
            )
            .collect()
    }

    pub fn elevation(&self, slot: Slot) -> Option<Elevation> {
        match slot {
            Slot::Center => Some(self.center.elevation),
            Slot::Ring(idx) => self.ring.get(idx).map(|r| r.elevation),
        }
    }

    /// Returns the ring elevation at `radius_m` toward `direction`.
    pub fn ring_elevation(&self, radius_m: f64, direction: Cardinal) -> Option<Elevation> {
        self.ring
            .iter()
            .find(|r| r.sample.radius_m == radius_m && r.sample.direction == direction)
            .map(|r| r.elevation)
    }

    /// Stores the outcome of a lookup.
    ///
    /// Each slot is written at most once; later writes are ignored.
    pub fn record(&mut self, slot: Slot, elevation: Elevation) {
        let generation = self.generation;
        let target = match slot {
            Slot::Center => &mut self.center.elevation,
            Slot::Ring(idx) => match self.ring.get_mut(idx) {
                Some(ring) => &mut ring.elevation,
                None => {
                    debug!("generation {generation}: no ring slot {idx}");
                    return;
                }
            },
        };
        if !target.is_pending() {
            debug!("generation {generation}: ignoring repeat write to {slot:?}");
            return;
        }
        let elevation = match elevation {
            Elevation::Meters(m) if !m.is_finite() => Elevation::Unavailable,
            other => other,
        };
        if elevation == Elevation::Unavailable {
            warn!("generation {generation}: no elevation data for {slot:?}, assessment cannot complete");
        }
        *target = elevation;
    }

    /// Returns all 9 elevations if every one is known.
    pub fn elevations(&self) -> Option<Elevations> {
        let center = self.center.elevation.meters()?;
        let mut ring = [0.0; RING_LEN];
        for (dst, src) in ring.iter_mut().zip(&self.ring) {
            *dst = src.elevation.meters()?;
        }
        let [n05, e05, s05, w05, n1, e1, s1, w1] = ring;
        Some(Elevations {
            center,
            ring_500m: [n05, e05, s05, w05],
            ring_1000m: [n1, e1, s1, w1],
        })
    }

    /// Computes the orography factor the first time all 9 elevations
    /// are known. Repeated calls are no-ops.
    pub fn evaluate(&mut self) -> Option<&Orography> {
        if self.orography.is_none() {
            if let Some(elevations) = self.elevations() {
                match compute(&elevations, self.tower_height_m) {
                    Ok(orography) => {
                        info!(
                            "generation {}: orography factor {:.2}, {:?}",
                            self.generation, orography.factor, orography.classification
                        );
                        self.orography = Some(orography);
                    }
                    Err(e) => warn!("generation {}: {e}", self.generation),
                }
            }
        }
        self.orography.as_ref()
    }

    /// True once no lookup is still pending.
    pub fn is_settled(&self) -> bool {
        !self.center.elevation.is_pending() && self.ring.iter().all(|r| !r.elevation.is_pending())
    }

    pub fn is_complete(&self) -> bool {
        self.orography.is_some()
    }

    /// Number of slots which will never hold data.
    pub fn unavailable(&self) -> usize {
        std::iter::once(self.center.elevation)
            .chain(self.ring.iter().map(|r| r.elevation))
            .filter(|e| *e == Elevation::Unavailable)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::{Elevation, SiteAssessment, Slot};
    use crate::{calculator::Classification, geodesic::Cardinal, GeoPoint};

    const SITE: GeoPoint = GeoPoint::new(50.8503, 4.3517);

    #[test]
    fn test_new() {
        let assessment = SiteAssessment::new(1, SITE, None);
        assert_eq!(assessment.tower_height_m, 30.0);
        assert_eq!(assessment.lookups().len(), 9);
        assert_eq!(assessment.lookups()[0], (Slot::Center, SITE));
        assert!(!assessment.is_settled());
        assert!(assessment.elevations().is_none());
    }

    #[test]
    fn test_eight_of_nine_never_computes() {
        let mut assessment = SiteAssessment::new(1, SITE, Some(30.0));
        for idx in 0..8 {
            assessment.record(Slot::Ring(idx), Elevation::Meters(100.0));
            assert!(assessment.evaluate().is_none());
        }
        assert!(!assessment.is_complete());

        assessment.record(Slot::Center, Elevation::Unavailable);
        assert!(assessment.evaluate().is_none());
        assert!(assessment.is_settled());
        assert!(!assessment.is_complete());
        assert_eq!(assessment.unavailable(), 1);
    }

    #[test]
    fn test_completes_in_any_order() {
        let mut assessment = SiteAssessment::new(1, SITE, Some(30.0));
        for idx in [7, 2, 5, 0, 1, 6, 3, 4] {
            assessment.record(Slot::Ring(idx), Elevation::Meters(100.0));
            assert!(assessment.evaluate().is_none());
        }
        assessment.record(Slot::Center, Elevation::Meters(200.0));
        let orography = *assessment.evaluate().unwrap();
        assert_eq!(orography.factor, 1.25);
        assert_eq!(orography.classification, Classification::Severe);

        // Re-evaluation is idempotent and later writes are ignored.
        assessment.record(Slot::Center, Elevation::Meters(100.0));
        assert_eq!(assessment.evaluate(), Some(&orography));
        assert_eq!(assessment.elevation(Slot::Center), Some(Elevation::Meters(200.0)));
    }

    #[test]
    fn test_non_finite_is_unavailable() {
        let mut assessment = SiteAssessment::new(1, SITE, None);
        assessment.record(Slot::Ring(3), Elevation::Meters(f64::NAN));
        assert_eq!(assessment.elevation(Slot::Ring(3)), Some(Elevation::Unavailable));
    }

    #[test]
    fn test_ring_elevation() {
        let mut assessment = SiteAssessment::new(1, SITE, None);
        // Ring index 6 is south at 1000 m.
        assessment.record(Slot::Ring(6), Elevation::Meters(42.0));
        assert_eq!(
            assessment.ring_elevation(1000.0, Cardinal::South),
            Some(Elevation::Meters(42.0))
        );
        assert_eq!(
            assessment.ring_elevation(500.0, Cardinal::South),
            Some(Elevation::Pending)
        );
        assert_eq!(assessment.ring_elevation(750.0, Cardinal::South), None);
        assert_eq!(assessment.elevation(Slot::Ring(8)), None);
    }

    #[test]
    fn test_elevations_order() {
        let mut assessment = SiteAssessment::new(1, SITE, None);
        assessment.record(Slot::Center, Elevation::Meters(0.0));
        for idx in 0..8 {
            assessment.record(Slot::Ring(idx), Elevation::Meters(idx as f64));
        }
        let elevations = assessment.elevations().unwrap();
        assert_eq!(elevations.ring_500m, [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(elevations.ring_1000m, [4.0, 5.0, 6.0, 7.0]);
    }
}
