mod gazetteer;
mod options;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use gazetteer::Gazetteer;
use log::warn;
use options::{Assess, Cli, Command, Overlay, Resolve, Site};
use orography::{CrsRegistry, OrographyError, Resolution, Session, SiteAssessment, SiteResolver};
use serde::Serialize;
use std::{path::Path, sync::Arc};
use terrain::TileSource;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let Cli { crs_table, cmd } = Cli::parse();
    let registry = Arc::new(open_registry(crs_table.as_deref())?);
    match cmd {
        Command::Resolve(resolve) => resolve.run(registry).await,
        Command::Assess(assess) => assess.run(registry).await,
        Command::Overlay(overlay) => overlay.run(registry).await,
    }
}

/// Returns the CRS registry, degraded to unavailable if its table is
/// invalid.
fn open_registry(maybe_path: Option<&Path>) -> Result<CrsRegistry> {
    match maybe_path {
        None => Ok(CrsRegistry::builtin().unwrap_or_else(|e| {
            warn!("projection subsystem unavailable, Lambert conversion disabled: {e}");
            CrsRegistry::unavailable()
        })),
        Some(path) => {
            let table = std::fs::read_to_string(path)
                .with_context(|| format!("reading CRS table {}", path.display()))?;
            Ok(CrsRegistry::init(&table))
        }
    }
}

impl Site {
    async fn resolve(&self, registry: Arc<CrsRegistry>) -> Result<Resolution> {
        let gazetteer = Gazetteer::open(self.gazetteer.as_deref())?;
        let resolver = SiteResolver::new(registry, gazetteer);
        Ok(resolver.resolve(&self.input()?).await?)
    }
}

impl Resolve {
    async fn run(self, registry: Arc<CrsRegistry>) -> Result<()> {
        let resolution = self.site.resolve(registry).await?;
        if self.json {
            println!("{}", report::to_json(&resolution)?);
        } else {
            print!("{}", report::ResolutionReport(&resolution));
        }
        Ok(())
    }
}

impl Assess {
    async fn run(self, registry: Arc<CrsRegistry>) -> Result<()> {
        #[derive(Serialize)]
        struct JsonReport<'a> {
            resolution: &'a Resolution,
            assessment: &'a SiteAssessment,
        }

        let gazetteer = Gazetteer::open(self.site.gazetteer.as_deref())?;
        let tiles = TileSource::new(self.tile_dir, self.tile_mode.into())?;
        let session = Session::new(registry, gazetteer, tiles);

        let (resolution, mut handle) = session
            .resolve_and_assess(&self.site.input()?, self.height)
            .await?;
        let assessment = handle.wait_settled().await?;

        if self.json {
            let json = report::to_json(&JsonReport {
                resolution: &resolution,
                assessment: &assessment,
            })?;
            println!("{json}");
        } else {
            print!(
                "{}",
                report::AssessmentReport {
                    resolution: &resolution,
                    assessment: &assessment,
                }
            );
        }

        if assessment.is_complete() {
            Ok(())
        } else {
            Err(OrographyError::IncompleteSamples.into())
        }
    }
}

impl Overlay {
    async fn run(self, registry: Arc<CrsRegistry>) -> Result<()> {
        let resolution = self.site.resolve(registry).await?;
        let collection = report::overlay_collection(resolution.point);
        println!("{}", report::to_json(&collection)?);
        Ok(())
    }
}
