//! Batch processing: one overlay, every document, in order

use crate::compose::compose;
use crate::naming::output_name;
use crate::overlay::{StampVariant, build_overlay};
use crate::source::SourceDocument;
use crate::types::*;

/// A successfully stamped document
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    /// Position of the source in the batch
    pub source_index: usize,
    /// Derived output name
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A document that could not be stamped and was left out
#[derive(Debug)]
pub struct DocumentFailure {
    pub source_index: usize,
    pub source_name: String,
    pub error: StampError,
}

/// Result of one batch run: successes and failures, both in input order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub composed: Vec<ComposedDocument>,
    pub failures: Vec<DocumentFailure>,
}

/// Stamp every document of `sources` with a freshly built overlay.
///
/// Per-document failures are collected and do not stop the batch. The call
/// fails as a whole only when the overlay cannot be built, or when not a
/// single document could be stamped.
pub async fn run_batch(
    sources: &[SourceDocument],
    variant: StampVariant,
    kind: ArtifactKind,
) -> Result<BatchOutcome> {
    let template = build_overlay(variant).inspect_err(|e| log::error!("{}", e))?;

    let mut outcome = BatchOutcome::default();

    for (source_index, source) in sources.iter().enumerate() {
        match compose(source.bytes(), &template) {
            Ok(bytes) => {
                log::debug!("Stamped {} ({:?})", source.name(), kind);
                outcome.composed.push(ComposedDocument {
                    source_index,
                    name: output_name(source.name()),
                    bytes,
                });
            }
            Err(error) => {
                log::warn!("Error processing file {}: {}", source.name(), error);
                outcome.failures.push(DocumentFailure {
                    source_index,
                    source_name: source.name().to_string(),
                    error,
                });
            }
        }

        // Let other tasks run between documents
        tokio::task::yield_now().await;
    }

    if outcome.composed.is_empty() {
        let error = StampError::NoValidDocuments { kind };
        log::error!("{} ({} documents failed)", error, outcome.failures.len());
        return Err(error);
    }

    log::info!(
        "{:?} run stamped {} of {} documents",
        kind,
        outcome.composed.len(),
        sources.len()
    );

    Ok(outcome)
}
