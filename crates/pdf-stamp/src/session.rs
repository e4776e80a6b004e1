//! Session state and the preview / commit pipeline entry points
//!
//! A [`Session`] owns exactly one [`BatchState`] at a time. Selecting new
//! documents (or clearing) replaces that state and revokes every handle it
//! held. Pipeline runs are split in three steps so a run can be in flight
//! while the session is still usable:
//!
//! 1. [`Session::begin`] snapshots the selection and takes the in-flight flag
//! 2. [`PipelineRun::execute`] stamps the documents without touching the session
//! 3. [`Session::complete`] stores the artifacts, or revokes them if the
//!    selection changed in the meantime
//!
//! [`Session::preview`] and [`Session::commit`] chain the three steps.

use crate::artifact::{ComposedArtifact, HandleRegistry, revoke_all};
use crate::batch::{DocumentFailure, run_batch};
use crate::overlay::StampVariant;
use crate::package::{DownloadUnit, package};
use crate::preview::PreviewSet;
use crate::source::{DocumentCandidate, SourceDocument, ingest};
use crate::types::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// Batch State
// =============================================================================

/// Everything derived from one selection
#[derive(Debug)]
pub struct BatchState {
    generation: u64,
    sources: Arc<[SourceDocument]>,
    previews: PreviewSet,
    finals: Vec<ComposedArtifact>,
    last_error: Option<String>,
    in_flight: Arc<AtomicBool>,
}

impl BatchState {
    fn new(generation: u64, sources: Vec<SourceDocument>) -> Self {
        Self {
            generation,
            sources: sources.into(),
            previews: PreviewSet::default(),
            finals: Vec::new(),
            last_error: None,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Increases every time a selection replaces the state
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sources(&self) -> &[SourceDocument] {
        &self.sources
    }

    pub fn previews(&self) -> &PreviewSet {
        &self.previews
    }

    /// Committed artifacts; empty until a commit succeeds
    pub fn finals(&self) -> &[ComposedArtifact] {
        &self.finals
    }

    /// Message of the last failed operation, for display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn revoke_all(&mut self) {
        self.previews.clear();
        revoke_all(&mut self.finals);
    }
}

impl Drop for BatchState {
    fn drop(&mut self) {
        self.revoke_all();
    }
}

/// Holds the in-flight flag of one batch state until dropped
#[derive(Debug)]
struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl RunGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// =============================================================================
// Pipeline Runs
// =============================================================================

/// A run that has been started but not executed yet
#[derive(Debug)]
pub struct PipelineRun {
    kind: ArtifactKind,
    generation: u64,
    variant: StampVariant,
    sources: Arc<[SourceDocument]>,
    registry: HandleRegistry,
    guard: RunGuard,
}

impl PipelineRun {
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Stamp the snapshot of the selection this run was started with
    pub async fn execute(self) -> FinishedRun {
        let result = run_batch(&self.sources, self.variant, self.kind)
            .await
            .map(|outcome| RunOutput {
                artifacts: outcome
                    .composed
                    .into_iter()
                    .map(|doc| {
                        ComposedArtifact::new(
                            &self.registry,
                            self.kind,
                            doc.source_index,
                            doc.name,
                            doc.bytes,
                        )
                    })
                    .collect(),
                failures: outcome.failures,
            });

        FinishedRun {
            kind: self.kind,
            generation: self.generation,
            result,
            guard: self.guard,
        }
    }
}

#[derive(Debug)]
struct RunOutput {
    artifacts: Vec<ComposedArtifact>,
    failures: Vec<DocumentFailure>,
}

/// An executed run waiting to be handed back to its session
#[derive(Debug)]
pub struct FinishedRun {
    kind: ArtifactKind,
    generation: u64,
    result: Result<RunOutput>,
    guard: RunGuard,
}

/// What a completed run produced
#[derive(Debug)]
pub struct RunSummary {
    pub kind: ArtifactKind,
    /// Number of artifacts now held by the session
    pub stamped: usize,
    /// Documents left out, in input order
    pub failures: Vec<DocumentFailure>,
}

// =============================================================================
// Session
// =============================================================================

/// Owner of the current batch state and of every artifact handle
#[derive(Debug)]
pub struct Session {
    registry: HandleRegistry,
    variant: StampVariant,
    last_generation: u64,
    state: BatchState,
}

impl Session {
    pub fn new(variant: StampVariant) -> Self {
        Self::with_registry(HandleRegistry::new(), variant)
    }

    /// Create a session minting handles in a registry shared with a viewer
    pub fn with_registry(registry: HandleRegistry, variant: StampVariant) -> Self {
        Self {
            registry,
            variant,
            last_generation: 0,
            state: BatchState::new(0, Vec::new()),
        }
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    pub fn variant(&self) -> StampVariant {
        self.variant
    }

    /// Change the geometry used by the next run
    pub fn set_variant(&mut self, variant: StampVariant) {
        self.variant = variant;
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Replace the selection with the PDF candidates.
    ///
    /// If none qualifies the current state is kept and only the error is
    /// recorded. Returns the number of accepted documents.
    pub fn select(
        &mut self,
        candidates: Vec<DocumentCandidate>,
        origin: SelectionOrigin,
    ) -> Result<usize> {
        match ingest(candidates, origin) {
            Ok(sources) => {
                let count = sources.len();
                self.replace_state(sources);
                log::info!("Selected {} documents", count);
                Ok(count)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Drop the selection and every artifact derived from it
    pub fn clear(&mut self) {
        self.replace_state(Vec::new());
    }

    fn replace_state(&mut self, sources: Vec<SourceDocument>) {
        self.state.revoke_all();
        self.last_generation += 1;
        self.state = BatchState::new(self.last_generation, sources);
    }

    /// Start a run over the current selection.
    ///
    /// Fails with [`StampError::Busy`] while another run of the same state
    /// is in flight.
    pub fn begin(&mut self, kind: ArtifactKind) -> Result<PipelineRun> {
        if self.state.sources.is_empty() {
            let e = StampError::Selection("No documents selected".to_string());
            self.record_error(&e);
            return Err(e);
        }
        if kind == ArtifactKind::Final && !self.state.finals.is_empty() {
            let e = StampError::AlreadyCommitted;
            self.record_error(&e);
            return Err(e);
        }

        let Some(guard) = RunGuard::acquire(&self.state.in_flight) else {
            log::warn!("Rejected {:?} run: another run is in flight", kind);
            return Err(StampError::Busy);
        };

        self.state.last_error = None;
        Ok(PipelineRun {
            kind,
            generation: self.state.generation,
            variant: self.variant,
            sources: Arc::clone(&self.state.sources),
            registry: self.registry.clone(),
            guard,
        })
    }

    /// Hand a finished run back.
    ///
    /// Artifacts of a run started before the latest selection are revoked
    /// on the spot and [`StampError::Superseded`] is returned.
    pub fn complete(&mut self, finished: FinishedRun) -> Result<RunSummary> {
        let FinishedRun {
            kind,
            generation,
            result,
            guard: _guard,
        } = finished;

        if generation != self.state.generation {
            if let Ok(mut output) = result {
                log::debug!(
                    "Revoking {} artifacts of a superseded {:?} run",
                    output.artifacts.len(),
                    kind
                );
                revoke_all(&mut output.artifacts);
            }
            return Err(StampError::Superseded);
        }

        let RunOutput {
            mut artifacts,
            failures,
        } = match result {
            Ok(output) => output,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };

        let stamped = artifacts.len();
        match kind {
            ArtifactKind::Preview => self.state.previews.replace(artifacts),
            ArtifactKind::Final if self.state.finals.is_empty() => self.state.finals = artifacts,
            ArtifactKind::Final => {
                revoke_all(&mut artifacts);
                let e = StampError::AlreadyCommitted;
                self.record_error(&e);
                return Err(e);
            }
        }

        Ok(RunSummary {
            kind,
            stamped,
            failures,
        })
    }

    /// Regenerate the previews of the current selection
    pub async fn preview(&mut self) -> Result<RunSummary> {
        self.run(ArtifactKind::Preview).await
    }

    /// Stamp the current selection for download.
    ///
    /// Always composes from scratch; previews are never reused.
    pub async fn commit(&mut self) -> Result<RunSummary> {
        self.run(ArtifactKind::Final).await
    }

    async fn run(&mut self, kind: ArtifactKind) -> Result<RunSummary> {
        let run = self.begin(kind)?;
        let finished = run.execute().await;
        self.complete(finished)
    }

    /// Move through the previews; clamped at both ends
    pub fn advance(&mut self, direction: Direction) -> usize {
        self.state.previews.advance(direction)
    }

    /// Show the preview at `index`, if it exists
    pub fn show_preview(&mut self, index: usize) -> usize {
        self.state.previews.show(index)
    }

    pub fn active_preview(&self) -> Option<&ComposedArtifact> {
        self.state.previews.active()
    }

    /// Package the committed artifacts into one downloadable unit
    pub fn download(&mut self) -> Result<DownloadUnit> {
        if self.state.finals.is_empty() {
            let e = StampError::NotCommitted;
            self.record_error(&e);
            return Err(e);
        }

        let result = package(&self.state.finals);
        if let Err(e) = &result {
            self.record_error(e);
        }
        result
    }

    fn record_error(&mut self, error: &StampError) {
        log::error!("{}", error);
        self.state.last_error = Some(error.to_string());
    }
}
