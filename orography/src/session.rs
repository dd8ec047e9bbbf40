use crate::{
    aggregator::{AssessmentHandle, ElevationAggregator},
    assessment::SiteAssessment,
    collaborator::{ElevationSource, Geocoder},
    crs::CrsRegistry,
    site::{Resolution, SiteInput, SiteResolver},
    OrographyError,
};
use log::info;
use std::sync::Arc;

/// Everything needed to assess sites, owned by the caller.
///
/// A session resolves user input and runs one assessment at a time:
/// starting a new one supersedes the previous.
pub struct Session<G, E> {
    resolver: SiteResolver<G>,
    aggregator: ElevationAggregator<E>,
}

impl<G: Geocoder, E: ElevationSource> Session<G, E> {
    /// Returns a new session. Must be called from within a tokio
    /// runtime.
    pub fn new(registry: Arc<CrsRegistry>, geocoder: G, elevations: E) -> Self {
        Self {
            resolver: SiteResolver::new(registry, geocoder),
            aggregator: ElevationAggregator::new(elevations),
        }
    }

    pub fn registry(&self) -> &CrsRegistry {
        self.resolver.registry()
    }

    pub async fn resolve(&self, input: &SiteInput) -> Result<Resolution, OrographyError> {
        let resolution = self.resolver.resolve(input).await?;
        info!(
            "resolved site to lat: {:.6}, lon: {:.6}",
            resolution.point.lat, resolution.point.lon
        );
        Ok(resolution)
    }

    /// Starts sampling elevations around a resolved site.
    pub fn assess(&self, resolution: &Resolution, tower_height_m: Option<f64>) -> AssessmentHandle {
        self.aggregator.start(resolution.point, tower_height_m)
    }

    /// Resolves `input` and starts assessing it.
    pub async fn resolve_and_assess(
        &self,
        input: &SiteInput,
        tower_height_m: Option<f64>,
    ) -> Result<(Resolution, AssessmentHandle), OrographyError> {
        let resolution = self.resolve(input).await?;
        let handle = self.assess(&resolution, tower_height_m);
        Ok((resolution, handle))
    }

    /// Returns a snapshot of the most recent assessment.
    pub fn current(&self) -> Option<SiteAssessment> {
        self.aggregator.current()
    }
}
