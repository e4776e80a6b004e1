use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

mod logger;
mod worker;

pub use logger::{DiagnosticLog, LogEntry, level_for_verbosity};
pub use worker::worker_task;

// Re-export types from the library crate
pub use pdf_stamp::{
    Direction, DocumentCandidate, DownloadKind, DownloadUnit, HandleId, HandleRegistry,
    SelectionOrigin, Session, StampOptions, StampVariant,
};

/// Commands sent from the front end to the worker
#[derive(Debug)]
pub enum StampCommand {
    /// Replace the selection with candidates the front end already read
    Select {
        candidates: Vec<DocumentCandidate>,
        origin: SelectionOrigin,
    },
    /// Replace the selection with files read from disk
    LoadFiles { paths: Vec<PathBuf> },
    /// Replace the selection with every PDF under a directory
    LoadDirectory { path: PathBuf },
    SetVariant { variant: StampVariant },
    GeneratePreviews,
    Navigate { direction: Direction },
    ShowPreview { index: usize },
    Commit,
    Package,
    Clear,
}

/// Updates sent from the worker to the front end, one per command
#[derive(Debug, Clone)]
pub enum StampUpdate {
    Selected {
        names: Vec<String>,
        total_bytes: usize,
    },
    VariantChanged {
        variant: StampVariant,
    },
    PreviewsGenerated {
        count: usize,
        failed: Vec<String>,
        active: Option<PreviewInfo>,
    },
    PreviewShown {
        preview: Option<PreviewInfo>,
    },
    Committed {
        count: usize,
        failed: Vec<String>,
    },
    Packaged {
        unit: DownloadUnit,
    },
    Cleared,
    Error {
        message: String,
    },
}

/// What the front end needs to display one preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewInfo {
    pub index: usize,
    pub total: usize,
    /// Derived output name
    pub name: String,
    /// Name of the document it was made from
    pub source_name: String,
    /// Resolve through the shared [`HandleRegistry`] while it is live
    pub handle: HandleId,
}

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("{0}")]
    Worker(String),
    #[error("Worker stopped")]
    Disconnected,
}

/// Request/response front end for a running [`worker_task`]
pub struct StampClient {
    command_tx: mpsc::UnboundedSender<StampCommand>,
    update_rx: mpsc::UnboundedReceiver<StampUpdate>,
}

impl StampClient {
    pub fn new(
        command_tx: mpsc::UnboundedSender<StampCommand>,
        update_rx: mpsc::UnboundedReceiver<StampUpdate>,
    ) -> Self {
        Self {
            command_tx,
            update_rx,
        }
    }

    /// Send one command and wait for its update.
    ///
    /// An [`StampUpdate::Error`] is turned into [`RuntimeError::Worker`].
    pub async fn request(&mut self, command: StampCommand) -> Result<StampUpdate, RuntimeError> {
        self.command_tx
            .send(command)
            .map_err(|_| RuntimeError::Disconnected)?;

        match self.update_rx.recv().await {
            Some(StampUpdate::Error { message }) => Err(RuntimeError::Worker(message)),
            Some(update) => Ok(update),
            None => Err(RuntimeError::Disconnected),
        }
    }
}
