//! Orography factor assessment for a structure site.
//!
//! A site entered as an address, WGS84 coordinates or Belgian Lambert
//! coordinates is resolved to a WGS84 point. Terrain elevation is then
//! sampled at the site and at 500 m and 1000 m toward each cardinal
//! direction, and the 9 elevations yield the orography factor used to
//! classify the site.
//!
//! Geocoding and elevation data are supplied by the caller through the
//! [Geocoder] and [ElevationSource] traits.

mod aggregator;
mod assessment;
mod calculator;
mod collaborator;
pub mod crs;
mod error;
pub mod geodesic;
pub mod overlay;
mod point;
mod session;
mod site;

pub use crate::{
    aggregator::{AssessmentHandle, ElevationAggregator},
    assessment::{Elevation, ElevationSample, RingElevation, SiteAssessment, Slot},
    calculator::{compute, Classification, Elevations, Orography, DEFAULT_TOWER_HEIGHT_M},
    collaborator::{Candidate, ElevationSource, Geocoder},
    crs::CrsRegistry,
    error::OrographyError,
    point::{GeoPoint, ProjectedPoint},
    session::Session,
    site::{parse_decimal, Resolution, SiteInput, SiteResolver},
};
pub use geo;
