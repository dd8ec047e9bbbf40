//! Concurrent elevation sampling around a site.
//!
//! A single actor task owns the current [SiteAssessment]. Lookups run
//! as independent tasks and report back over a channel, tagged with
//! the generation they were issued for. Starting a new assessment
//! bumps the generation, after which late results of the previous one
//! are dropped instead of being written into the new one.

use crate::{
    assessment::{Elevation, SiteAssessment, Slot},
    collaborator::ElevationSource,
    GeoPoint, OrographyError,
};
use log::{debug, error};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

enum Command {
    Begin(SiteAssessment),
    Arrival {
        generation: u64,
        slot: Slot,
        elevation: Elevation,
    },
}

pub struct ElevationAggregator<E> {
    source: Arc<E>,
    generation: Arc<AtomicU64>,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Option<SiteAssessment>>,
    actor: JoinHandle<()>,
}

impl<E: ElevationSource> ElevationAggregator<E> {
    /// Returns a new aggregator.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(source: E) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(None);
        let actor = tokio::spawn(run_actor(rx, snapshot_tx));
        Self {
            source: Arc::new(source),
            generation: Arc::new(AtomicU64::new(0)),
            commands,
            snapshots,
            actor,
        }
    }

    /// Starts sampling the 9 elevations around `center`, superseding
    /// any assessment in progress.
    pub fn start(&self, center: GeoPoint, tower_height_m: Option<f64>) -> AssessmentHandle {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let assessment = SiteAssessment::new(generation, center, tower_height_m);
        let lookups = assessment.lookups();
        debug!(
            "generation {generation}: sampling {} points around {center:?}",
            lookups.len()
        );

        if self.commands.send(Command::Begin(assessment)).is_err() {
            error!("generation {generation}: aggregator has shut down");
        }

        for (slot, point) in lookups {
            let source = Arc::clone(&self.source);
            let current = Arc::clone(&self.generation);
            let commands = self.commands.clone();
            tokio::spawn(async move {
                let elevation = match source.elevation(point).await {
                    Ok(values) => values
                        .first()
                        .copied()
                        .map_or(Elevation::Unavailable, Elevation::Meters),
                    Err(e) => {
                        error!("generation {generation}: elevation lookup at {point:?} failed: {e}");
                        Elevation::Unavailable
                    }
                };
                if current.load(Ordering::SeqCst) != generation {
                    debug!("generation {generation}: superseded, dropping {slot:?}");
                    return;
                }
                // A closed channel means the aggregator is gone.
                let _ = commands.send(Command::Arrival {
                    generation,
                    slot,
                    elevation,
                });
            });
        }

        AssessmentHandle {
            generation,
            snapshots: self.snapshots.clone(),
        }
    }

    /// Returns the current generation, 0 before the first assessment.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of the current assessment.
    pub fn current(&self) -> Option<SiteAssessment> {
        self.snapshots.borrow().clone()
    }

    /// Returns a receiver notified on every change of the current
    /// assessment.
    pub fn subscribe(&self) -> watch::Receiver<Option<SiteAssessment>> {
        self.snapshots.clone()
    }
}

impl<E> Drop for ElevationAggregator<E> {
    fn drop(&mut self) {
        self.actor.abort();
    }
}

async fn run_actor(
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Option<SiteAssessment>>,
) {
    let mut current: Option<SiteAssessment> = None;

    while let Some(command) = commands.recv().await {
        match command {
            Command::Begin(assessment) => {
                if matches!(&current, Some(cur) if cur.generation > assessment.generation) {
                    debug!("generation {}: already superseded", assessment.generation);
                    continue;
                }
                current = Some(assessment);
            }
            Command::Arrival {
                generation,
                slot,
                elevation,
            } => match current.as_mut() {
                Some(assessment) if assessment.generation == generation => {
                    assessment.record(slot, elevation);
                    assessment.evaluate();
                }
                _ => {
                    debug!("generation {generation}: discarding stale {slot:?}");
                    continue;
                }
            },
        }
        snapshots.send_replace(current.clone());
    }
}

/// Observer of one assessment.
#[derive(Debug, Clone)]
pub struct AssessmentHandle {
    generation: u64,
    snapshots: watch::Receiver<Option<SiteAssessment>>,
}

impl AssessmentHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the latest state of this assessment, unless it has been
    /// superseded.
    pub fn snapshot(&self) -> Option<SiteAssessment> {
        self.snapshots
            .borrow()
            .as_ref()
            .filter(|a| a.generation == self.generation)
            .cloned()
    }

    /// Waits until no lookup is pending.
    ///
    /// Every lookup either yields an elevation or marks its slot
    /// unavailable, so this resolves once all 9 have answered. The
    /// returned assessment may still be incomplete.
    pub async fn wait_settled(&mut self) -> Result<SiteAssessment, OrographyError> {
        self.wait_for(SiteAssessment::is_settled).await
    }

    /// Waits until the orography factor is known.
    ///
    /// Never resolves for an assessment with an unavailable slot.
    pub async fn wait_complete(&mut self) -> Result<SiteAssessment, OrographyError> {
        self.wait_for(SiteAssessment::is_complete).await
    }

    async fn wait_for(
        &mut self,
        ready: impl Fn(&SiteAssessment) -> bool,
    ) -> Result<SiteAssessment, OrographyError> {
        let generation = self.generation;
        let state = self
            .snapshots
            .wait_for(|snapshot| match snapshot {
                Some(a) => a.generation > generation || (a.generation == generation && ready(a)),
                None => false,
            })
            .await
            .map_err(|_| OrographyError::AggregatorClosed)?;
        match &*state {
            Some(a) if a.generation == generation => Ok(a.clone()),
            _ => Err(OrographyError::Superseded(generation)),
        }
    }
}
