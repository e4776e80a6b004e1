pub mod artifact;
mod batch;
mod compose;
pub mod constants;
mod naming;
mod options;
mod overlay;
mod package;
mod preview;
pub mod render;
mod session;
mod source;
mod types;

pub use artifact::{ArtifactHandle, ComposedArtifact, HandleId, HandleRegistry, RegistryStats};
pub use batch::{BatchOutcome, ComposedDocument, DocumentFailure, run_batch};
pub use compose::{compose, stamp_document, stamped_pages};
pub use naming::output_name;
pub use options::StampOptions;
pub use overlay::{OverlayTemplate, Point, StampVariant, Stroke, build_overlay};
pub use package::{DownloadKind, DownloadUnit, archive_entry_name, package};
pub use preview::PreviewSet;
pub use session::{BatchState, FinishedRun, PipelineRun, RunSummary, Session};
pub use source::{DocumentCandidate, SourceDocument, ingest, load_directory, load_files};
pub use types::*;
