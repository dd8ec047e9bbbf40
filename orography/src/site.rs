//! Turning user input into a canonical WGS84 site.

use crate::{
    collaborator::Geocoder,
    crs::{CrsRegistry, LAMBERT2008, LAMBERT72},
    GeoPoint, OrographyError, ProjectedPoint,
};
use log::{debug, error};
use serde::Serialize;
use std::sync::Arc;

/// A site as entered by the user.
///
/// Numeric fields are raw text; both `.` and `,` are accepted as the
/// decimal separator.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteInput {
    /// Free-text address.
    Address(String),
    /// WGS84 longitude and latitude.
    LonLat { lon: String, lat: String },
    /// Belgian Lambert 72 easting and northing.
    Lambert72 { x: String, y: String },
    /// Belgian Lambert 2008 easting and northing.
    Lambert2008 { x: String, y: String },
    /// An already known location, e.g. picked on a map.
    Point(GeoPoint),
}

/// A successfully resolved site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub point: GeoPoint,
    /// Projected form of the site for display: the user's own Lambert
    /// input, otherwise Lambert 72. Absent when projection is
    /// unavailable.
    pub projected: Option<ProjectedPoint>,
}

pub struct SiteResolver<G> {
    registry: Arc<CrsRegistry>,
    geocoder: G,
}

impl<G: Geocoder> SiteResolver<G> {
    pub fn new(registry: Arc<CrsRegistry>, geocoder: G) -> Self {
        Self { registry, geocoder }
    }

    pub fn registry(&self) -> &CrsRegistry {
        &self.registry
    }

    pub async fn resolve(&self, input: &SiteInput) -> Result<Resolution, OrographyError> {
        let (point, projected) = match input {
            SiteInput::Address(query) => (self.geocode(query).await?, None),
            SiteInput::LonLat { lon, lat } => {
                let lon = parse_decimal("longitude", lon)?;
                let lat = parse_decimal("latitude", lat)?;
                (GeoPoint::validated(lat, lon)?, None)
            }
            SiteInput::Lambert72 { x, y } => self.unproject(LAMBERT72, x, y)?,
            SiteInput::Lambert2008 { x, y } => self.unproject(LAMBERT2008, x, y)?,
            SiteInput::Point(point) => (GeoPoint::validated(point.lat, point.lon)?, None),
        };

        let projected = projected.or_else(|| match self.registry.project(point, LAMBERT72) {
            Ok(projected) => Some(projected),
            Err(e) => {
                debug!("no Lambert 72 display form for {point:?}: {e}");
                None
            }
        });

        Ok(Resolution { point, projected })
    }

    async fn geocode(&self, query: &str) -> Result<GeoPoint, OrographyError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(OrographyError::AddressNotFound(query.to_owned()));
        }
        let candidates = self.geocoder.search(query).await.map_err(|e| {
            error!("geocoding '{query}' failed: {e}");
            OrographyError::NetworkFailure(e.to_string())
        })?;
        let first = candidates
            .first()
            .ok_or_else(|| OrographyError::AddressNotFound(query.to_owned()))?;
        debug!("geocoded '{query}' to {first:?}");
        let lat = parse_decimal("latitude", &first.lat)?;
        let lon = parse_decimal("longitude", &first.lon)?;
        GeoPoint::validated(lat, lon)
    }

    fn unproject(
        &self,
        crs: &str,
        x: &str,
        y: &str,
    ) -> Result<(GeoPoint, Option<ProjectedPoint>), OrographyError> {
        self.registry.ensure_available()?;
        let projected = ProjectedPoint::new(
            parse_decimal("Lambert X", x)?,
            parse_decimal("Lambert Y", y)?,
            crs,
        );
        let point = self.registry.unproject(&projected)?;
        Ok((point, Some(projected)))
    }
}

/// Parses a finite decimal, accepting `,` as the decimal separator.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, OrographyError> {
    raw.trim()
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(OrographyError::InvalidNumber(field))
}

#[cfg(test)]
mod tests {
    use super::{parse_decimal, SiteInput, SiteResolver};
    use crate::{
        collaborator::{Candidate, Geocoder},
        crs::{CrsRegistry, LAMBERT2008, LAMBERT72},
        GeoPoint, OrographyError,
    };
    use approx::assert_abs_diff_eq;
    use std::{future::Future, sync::Arc};

    #[derive(Debug, thiserror::Error)]
    #[error("service unavailable")]
    struct Down;

    enum FakeGeocoder {
        Found(Vec<Candidate>),
        Down,
    }

    impl Geocoder for FakeGeocoder {
        type Error = Down;

        fn search(
            &self,
            _query: &str,
        ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send {
            let result = match self {
                Self::Found(candidates) => Ok(candidates.clone()),
                Self::Down => Err(Down),
            };
            async move { result }
        }
    }

    fn candidate(lat: &str, lon: &str) -> Candidate {
        Candidate {
            lat: lat.to_owned(),
            lon: lon.to_owned(),
            display_name: None,
        }
    }

    fn resolver(geocoder: FakeGeocoder) -> SiteResolver<FakeGeocoder> {
        SiteResolver::new(Arc::new(CrsRegistry::builtin().unwrap()), geocoder)
    }

    fn lonlat(lon: &str, lat: &str) -> SiteInput {
        SiteInput::LonLat {
            lon: lon.to_owned(),
            lat: lat.to_owned(),
        }
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("x", "4.3517").unwrap(), 4.3517);
        assert_eq!(parse_decimal("x", " 4,3517 ").unwrap(), 4.3517);
        assert_eq!(parse_decimal("x", "-12").unwrap(), -12.0);
        for bad in ["", "abc", "1,2,3", "inf", "NaN", "1e400"] {
            assert!(matches!(
                parse_decimal("x", bad),
                Err(OrographyError::InvalidNumber("x"))
            ));
        }
    }

    #[tokio::test]
    async fn test_lonlat() {
        let resolver = resolver(FakeGeocoder::Found(Vec::new()));
        let resolution = resolver.resolve(&lonlat("4,3517", "50.8503")).await.unwrap();
        assert_eq!(resolution.point, GeoPoint::new(50.8503, 4.3517));
        let projected = resolution.projected.unwrap();
        assert_eq!(projected.crs, LAMBERT72);
        assert_abs_diff_eq!(projected.x, 148_799.170, epsilon = 0.01);
    }

    #[tokio::test]
    async fn test_lonlat_out_of_range() {
        let resolver = resolver(FakeGeocoder::Found(Vec::new()));
        let err = resolver.resolve(&lonlat("10", "95")).await.unwrap_err();
        assert!(matches!(err, OrographyError::InvalidRange { lat, lon } if lat == 95.0 && lon == 10.0));
        assert!(err.is_invalid_input());

        let err = resolver.resolve(&lonlat("x", "50")).await.unwrap_err();
        assert!(matches!(err, OrographyError::InvalidNumber("longitude")));
    }

    #[tokio::test]
    async fn test_address() {
        let resolver = resolver(FakeGeocoder::Found(vec![
            candidate("50.8467", "4.3525"),
            candidate("0", "0"),
        ]));
        let resolution = resolver
            .resolve(&SiteInput::Address("Grand-Place, Brussels".into()))
            .await
            .unwrap();
        assert_eq!(resolution.point, GeoPoint::new(50.8467, 4.3525));
        assert!(resolution.projected.is_some());
    }

    #[tokio::test]
    async fn test_address_not_found() {
        let resolver = resolver(FakeGeocoder::Found(Vec::new()));
        for query in ["nowhere", "   ", ""] {
            assert!(matches!(
                resolver.resolve(&SiteInput::Address(query.into())).await,
                Err(OrographyError::AddressNotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_address_network_failure() {
        let resolver = resolver(FakeGeocoder::Down);
        assert!(matches!(
            resolver.resolve(&SiteInput::Address("Brussels".into())).await,
            Err(OrographyError::NetworkFailure(msg)) if msg == "service unavailable"
        ));
    }

    #[tokio::test]
    async fn test_address_bad_candidate() {
        let resolver = resolver(FakeGeocoder::Found(vec![candidate("north", "4.35")]));
        assert!(matches!(
            resolver.resolve(&SiteInput::Address("Brussels".into())).await,
            Err(OrographyError::InvalidNumber("latitude"))
        ));
    }

    #[tokio::test]
    async fn test_lambert_keeps_input_for_display() {
        let resolver = resolver(FakeGeocoder::Found(Vec::new()));
        let resolution = resolver
            .resolve(&SiteInput::Lambert2008 {
                x: "648798,736".into(),
                y: "671100.414".into(),
            })
            .await
            .unwrap();
        assert_abs_diff_eq!(resolution.point.lat, 50.8503, epsilon = 1e-6);
        assert_abs_diff_eq!(resolution.point.lon, 4.3517, epsilon = 1e-6);
        let projected = resolution.projected.unwrap();
        assert_eq!(projected.crs, LAMBERT2008);
        assert_eq!(projected.x, 648_798.736);
        assert_eq!(projected.y, 671_100.414);
    }

    #[tokio::test]
    async fn test_lambert72() {
        let resolver = resolver(FakeGeocoder::Found(Vec::new()));
        let resolution = resolver
            .resolve(&SiteInput::Lambert72 {
                x: "148799.170".into(),
                y: "171100.155".into(),
            })
            .await
            .unwrap();
        assert_abs_diff_eq!(resolution.point.lat, 50.8503, epsilon = 1e-6);
        assert_abs_diff_eq!(resolution.point.lon, 4.3517, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_projection_unavailable() {
        let resolver = SiteResolver::new(
            Arc::new(CrsRegistry::unavailable()),
            FakeGeocoder::Found(vec![candidate("50.85", "4.35")]),
        );
        assert!(matches!(
            resolver
                .resolve(&SiteInput::Lambert72 {
                    x: "not a number".into(),
                    y: "1".into()
                })
                .await,
            Err(OrographyError::ProjectionUnavailable)
        ));

        // Geographic input still works, without a display projection.
        let resolution = resolver.resolve(&lonlat("4.35", "50.85")).await.unwrap();
        assert!(resolution.projected.is_none());
        let resolution = resolver
            .resolve(&SiteInput::Address("Brussels".into()))
            .await
            .unwrap();
        assert_eq!(resolution.point, GeoPoint::new(50.85, 4.35));
    }

    #[tokio::test]
    async fn test_point() {
        let resolver = resolver(FakeGeocoder::Found(Vec::new()));
        assert!(resolver
            .resolve(&SiteInput::Point(GeoPoint::new(50.0, 4.0)))
            .await
            .is_ok());
        assert!(matches!(
            resolver
                .resolve(&SiteInput::Point(GeoPoint::new(-91.0, 4.0)))
                .await,
            Err(OrographyError::InvalidRange { .. })
        ));
    }
}
