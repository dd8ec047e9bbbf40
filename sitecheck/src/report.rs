//! Text, JSON and GeoJSON presentation of results.

use geojson::{Feature, FeatureCollection, Geometry, Value};
use orography::{
    crs::{LAMBERT2008, LAMBERT72},
    geodesic::RING_RADII_M,
    overlay::site_overlays,
    Elevation, GeoPoint, ProjectedPoint, Resolution, SiteAssessment,
};
use serde::Serialize;
use std::fmt;

/// Text report of a resolved site.
pub struct ResolutionReport<'a>(pub &'a Resolution);

impl fmt::Display for ResolutionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let GeoPoint { lat, lon } = self.0.point;
        writeln!(f, "Latitude:  {lat:.6}")?;
        writeln!(f, "Longitude: {lon:.6}")?;
        match &self.0.projected {
            Some(projected) => writeln!(f, "{}", Projected(projected)),
            None => writeln!(f, "Lambert:   not available"),
        }
    }
}

struct Projected<'a>(&'a ProjectedPoint);

impl fmt::Display for Projected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ProjectedPoint { x, y, crs } = self.0;
        let name = match crs.as_str() {
            LAMBERT72 => "Lambert 72",
            LAMBERT2008 => "Lambert 2008",
            other => other,
        };
        write!(f, "{name}: X {x:.3}, Y {y:.3}")
    }
}

struct Meters(Elevation);

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Elevation::Meters(m) => write!(f, "{m:.1} m"),
            Elevation::Pending => f.write_str("pending"),
            Elevation::Unavailable => f.write_str("not available"),
        }
    }
}

/// Text report of a site and its assessment.
pub struct AssessmentReport<'a> {
    pub resolution: &'a Resolution,
    pub assessment: &'a SiteAssessment,
}

impl fmt::Display for AssessmentReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assessment = self.assessment;
        write!(f, "{}", ResolutionReport(self.resolution))?;
        writeln!(f, "Tower height: {} m", assessment.tower_height_m)?;
        writeln!(f, "Center: {}", Meters(assessment.center.elevation))?;
        for radius in RING_RADII_M {
            for ring in assessment.ring.iter().filter(|r| r.sample.radius_m == radius) {
                writeln!(
                    f,
                    "{:<5} {radius:>4} m: {}",
                    ring.sample.direction.name(),
                    Meters(ring.elevation)
                )?;
            }
        }
        match &assessment.orography {
            Some(orography) => {
                writeln!(f, "Mean elevation: {:.2} m", orography.mean_elevation_m)?;
                writeln!(
                    f,
                    "Relative elevation: {:.2} m",
                    orography.relative_elevation_m
                )?;
                writeln!(f, "Orography factor: {:.2}", orography.factor)?;
                writeln!(f, "{}", orography.classification)
            }
            None => writeln!(
                f,
                "Orography factor: not available, elevation data is missing for {} point(s)",
                assessment.unavailable()
            ),
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Returns the site's sampling circles and cross as GeoJSON.
pub fn overlay_collection(center: GeoPoint) -> FeatureCollection {
    let overlays = site_overlays(center);
    let mut features = Vec::with_capacity(overlays.circles.len() + 2);
    for (radius, circle) in &overlays.circles {
        let mut feature = Feature::from(Geometry::new(Value::from(circle)));
        feature.set_property("radius", *radius);
        features.push(feature);
    }
    for (kind, line) in [("ns", &overlays.north_south), ("ew", &overlays.west_east)] {
        let mut feature = Feature::from(Geometry::new(Value::from(line)));
        feature.set_property("kind", kind);
        features.push(feature);
    }
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{overlay_collection, AssessmentReport, ResolutionReport};
    use orography::{
        crs::{LAMBERT2008, LAMBERT72},
        Elevation, GeoPoint, ProjectedPoint, Resolution, SiteAssessment, Slot,
    };

    const BRUSSELS: GeoPoint = GeoPoint::new(50.8503, 4.3517);

    fn resolution_text(resolution: &Resolution) -> String {
        ResolutionReport(resolution).to_string()
    }

    fn assessment_text(resolution: &Resolution, assessment: &SiteAssessment) -> String {
        AssessmentReport {
            resolution,
            assessment,
        }
        .to_string()
    }

    fn resolution(projected: Option<ProjectedPoint>) -> Resolution {
        Resolution {
            point: BRUSSELS,
            projected,
        }
    }

    #[test]
    fn test_resolution_text() {
        let text = resolution_text(&resolution(Some(ProjectedPoint::new(
            148_799.170_2,
            171_100.154_8,
            LAMBERT72,
        ))));
        assert!(text.contains("Latitude:  50.850300"));
        assert!(text.contains("Longitude: 4.351700"));
        assert!(text.contains("Lambert 72: X 148799.170, Y 171100.155"));

        let text = resolution_text(&resolution(Some(ProjectedPoint::new(
            648_798.736,
            671_100.414,
            LAMBERT2008,
        ))));
        assert!(text.contains("Lambert 2008: X 648798.736, Y 671100.414"));

        let text = resolution_text(&resolution(None));
        assert!(text.contains("Lambert:   not available"));
    }

    #[test]
    fn test_assessment_text() {
        let mut assessment = SiteAssessment::new(1, BRUSSELS, None);
        assessment.record(Slot::Center, Elevation::Meters(120.0));
        for idx in 0..8 {
            assessment.record(Slot::Ring(idx), Elevation::Meters(100.0));
        }
        assessment.evaluate();
        let text = assessment_text(&resolution(None), &assessment);
        assert!(text.contains("Center: 120.0 m"));
        assert!(text.contains("north  500 m: 100.0 m"));
        assert!(text.contains("west  1000 m: 100.0 m"));
        assert!(text.contains("Orography factor: 1.05"));
        assert!(text.contains("Site is NOT flat. Standard pieces"));
    }

    #[test]
    fn test_assessment_text_line_layout() {
        let mut assessment = SiteAssessment::new(1, BRUSSELS, None);
        assessment.record(Slot::Center, Elevation::Meters(120.0));
        for idx in 0..8 {
            assessment.record(Slot::Ring(idx), Elevation::Meters(100.0));
        }
        assessment.evaluate();
        let text = assessment_text(&resolution(None), &assessment);
        let lines: Vec<&str> = text.lines().collect();
        // 3 location, tower, center, 8 ring, 4 result
        assert_eq!(lines.len(), 17);
        assert_eq!(lines[0], format!("Latitude:  {:.6}", BRUSSELS.lat));
        assert_eq!(lines[2], "Lambert:   not available");
        assert_eq!(lines[3], "Tower height: 30 m");
        assert_eq!(lines[4], "Center: 120.0 m");
        assert_eq!(lines[13], "Mean elevation: 104.00 m");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_incomplete_assessment_text() {
        let mut assessment = SiteAssessment::new(1, BRUSSELS, Some(10.0));
        assessment.record(Slot::Center, Elevation::Unavailable);
        let text = assessment_text(&resolution(None), &assessment);
        assert!(text.contains("Center: not available"));
        assert!(text.contains("east   500 m: pending"));
        assert!(text.contains("missing for 1 point(s)"));
    }

    #[test]
    fn test_overlay_collection() {
        let collection = overlay_collection(BRUSSELS);
        assert_eq!(collection.features.len(), 4);
        assert_eq!(
            collection.features[0].property("radius"),
            Some(&serde_json::json!(500.0))
        );
        assert_eq!(
            collection.features[3].property("kind"),
            Some(&serde_json::json!("ew"))
        );
        let json = serde_json::to_string(&collection).unwrap();
        assert!(json.contains("\"Polygon\""));
        assert!(json.contains("\"LineString\""));
    }
}
