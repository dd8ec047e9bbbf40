//! External services the core depends on.
//!
//! The transports behind these traits (HTTP clients, local tile
//! stores, test fakes) live outside this crate.

use crate::GeoPoint;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A single geocoding result.
///
/// Coordinates are kept as the decimal strings geocoding services
/// return; the resolver parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub lat: String,
    pub lon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Free-text address search.
pub trait Geocoder: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns candidates for `query`, best match first.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send;
}

/// Point elevation lookup.
pub trait ElevationSource: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns elevations (meters) at `point`. Only the first value is
    /// used; an empty list means no data is available there.
    fn elevation(&self, point: GeoPoint) -> impl Future<Output = Result<Vec<f64>, Self::Error>> + Send;
}
