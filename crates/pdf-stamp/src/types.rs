use thiserror::Error;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("{0}")]
    Selection(String),
    #[error("Failed to load PDF: {0}")]
    Load(#[source] lopdf::Error),
    #[error("Failed to build overlay template: {0}")]
    OverlayBuild(String),
    #[error("Failed to create download package: {0}")]
    Packaging(String),
    #[error("{}", no_valid_documents_message(.kind))]
    NoValidDocuments { kind: ArtifactKind },
    #[error("A pipeline run is already in progress")]
    Busy,
    #[error("Documents have already been processed")]
    AlreadyCommitted,
    #[error("Documents have not been processed yet")]
    NotCommitted,
    #[error("Run was superseded by a newer selection")]
    Superseded,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for StampError {
    fn from(err: zip::result::ZipError) -> Self {
        StampError::Packaging(err.to_string())
    }
}

fn no_valid_documents_message(kind: &ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Preview => {
            "Could not generate previews for any files. Please check if they are valid PDFs."
        }
        ArtifactKind::Final => {
            "Failed to process all selected files. Please check if they are valid PDFs."
        }
    }
}

pub type Result<T> = std::result::Result<T, StampError>;

/// Which pipeline path produced an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Disposable output shown before committing
    Preview,
    /// Committed output, the only kind that can be packaged
    Final,
}

/// Preview navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Where a selection came from; only changes the message of an empty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionOrigin {
    /// Individually picked files
    #[default]
    Files,
    /// Every file found under a directory
    Directory,
}
