//! Output packaging: one artifact passes through, several become a zip

use crate::artifact::ComposedArtifact;
use crate::constants::{ARCHIVE_FOLDER, ARCHIVE_NAME};
use crate::types::{Result, StampError};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What a download unit contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// A single stamped PDF, unwrapped
    Document,
    /// A zip archive of several stamped PDFs
    Archive,
}

/// The single file handed to the user
#[derive(Debug, Clone)]
pub struct DownloadUnit {
    pub kind: DownloadKind,
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DownloadUnit {
    /// Write the unit into `dir` under its own name
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.name);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// Turn committed artifacts into exactly one downloadable unit.
///
/// Callers must not pass an empty slice; doing so is reported as a
/// packaging error.
pub fn package(artifacts: &[ComposedArtifact]) -> Result<DownloadUnit> {
    match artifacts {
        [] => Err(StampError::Packaging("no artifacts to package".to_string())),
        [single] => Ok(DownloadUnit {
            kind: DownloadKind::Document,
            name: single.name().to_string(),
            bytes: single.bytes().to_vec(),
        }),
        many => {
            let bytes = build_archive(many).inspect_err(|e| log::error!("{}", e))?;
            log::info!("Packaged {} documents into {}", many.len(), ARCHIVE_NAME);
            Ok(DownloadUnit {
                kind: DownloadKind::Archive,
                name: ARCHIVE_NAME.to_string(),
                bytes,
            })
        }
    }
}

fn build_archive(artifacts: &[ComposedArtifact]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for artifact in artifacts {
        writer.start_file(archive_entry_name(artifact.name()), entry_options())?;
        writer
            .write_all(artifact.bytes())
            .map_err(|e| StampError::Packaging(e.to_string()))?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Path of an artifact inside the archive
pub fn archive_entry_name(name: &str) -> String {
    format!("{}/{}", ARCHIVE_FOLDER, name)
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}
