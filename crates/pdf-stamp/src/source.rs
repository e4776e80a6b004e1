//! Ingestion of source documents
//!
//! Raw candidates (a name, an optional declared type and bytes) are
//! validated here, once. Everything downstream works with
//! [`SourceDocument`] only.

use crate::constants::{PDF_EXTENSION, PDF_MIME_TYPE};
use crate::naming::output_name;
use crate::types::{Result, SelectionOrigin, StampError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A file offered for selection, before validation
#[derive(Debug, Clone)]
pub struct DocumentCandidate {
    pub name: String,
    /// Declared media type, when the picker reports one
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DocumentCandidate {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            bytes,
        }
    }

    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    /// Coarse identification by declared type or file-name suffix
    pub fn is_pdf(&self) -> bool {
        is_pdf_name(&self.name) || self.declared_type.as_deref() == Some(PDF_MIME_TYPE)
    }
}

fn is_pdf_name(name: &str) -> bool {
    name.ends_with(PDF_EXTENSION)
}

/// An accepted input document. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    bytes: Arc<[u8]>,
}

impl SourceDocument {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Keep the PDF candidates, in order, dropping the rest silently.
///
/// An empty result is a [`StampError::Selection`] whose message depends on
/// where the candidates came from. Two documents whose output names collide
/// are rejected as well, since their outputs could not be packaged together.
pub fn ingest(
    candidates: Vec<DocumentCandidate>,
    origin: SelectionOrigin,
) -> Result<Vec<SourceDocument>> {
    let offered = candidates.len();
    let documents: Vec<SourceDocument> = candidates
        .into_iter()
        .filter(DocumentCandidate::is_pdf)
        .map(|candidate| SourceDocument {
            name: candidate.name,
            bytes: candidate.bytes.into(),
        })
        .collect();

    if documents.is_empty() {
        return Err(StampError::Selection(
            match origin {
                SelectionOrigin::Directory => "No PDF files found in the selected directory",
                SelectionOrigin::Files => "Please select PDF files only",
            }
            .to_string(),
        ));
    }

    let mut output_names = HashSet::new();
    for document in &documents {
        let name = output_name(&document.name);
        if !output_names.insert(name.clone()) {
            return Err(StampError::Selection(format!(
                "More than one selected file would be saved as {}",
                name
            )));
        }
    }

    if documents.len() < offered {
        log::debug!(
            "Dropped {} non-PDF entries from selection",
            offered - documents.len()
        );
    }

    Ok(documents)
}

/// Read the given files into candidates, named by their file names
pub async fn load_files(paths: &[impl AsRef<Path>]) -> Result<Vec<DocumentCandidate>> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        candidates.push(load_candidate(path.as_ref()).await?);
    }
    Ok(candidates)
}

/// Read every PDF below `dir`, recursively, in path order.
///
/// Entries that do not look like PDFs are skipped without being read.
pub async fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<DocumentCandidate>> {
    let mut pending = vec![dir.as_ref().to_owned()];
    let mut files: Vec<PathBuf> = Vec::new();

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_pdf_name)
            {
                files.push(path);
            }
        }
    }

    files.sort();
    load_files(&files).await
}

async fn load_candidate(path: &Path) -> Result<DocumentCandidate> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(DocumentCandidate::new(name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> DocumentCandidate {
        DocumentCandidate::new(name, b"%PDF-1.7".to_vec())
    }

    #[test]
    fn test_identification() {
        assert!(candidate("a.pdf").is_pdf());
        assert!(!candidate("a.txt").is_pdf());
        assert!(!candidate("a.PDF").is_pdf());
        assert!(candidate("scan").with_declared_type("application/pdf").is_pdf());
        assert!(!candidate("scan").with_declared_type("image/png").is_pdf());
    }

    #[test]
    fn test_ingest_filters_and_keeps_order() {
        let docs = ingest(
            vec![candidate("b.pdf"), candidate("notes.txt"), candidate("a.pdf")],
            SelectionOrigin::Directory,
        )
        .unwrap();

        let names: Vec<_> = docs.iter().map(SourceDocument::name).collect();
        assert_eq!(names, ["b.pdf", "a.pdf"]);
        assert_eq!(docs[0].size(), 8);
    }

    #[test]
    fn test_ingest_rejects_colliding_output_names() {
        let err = ingest(
            vec![candidate("a.pdf"), candidate("b.pdf"), candidate("a.pdf")],
            SelectionOrigin::Files,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "More than one selected file would be saved as a_rv.pdf"
        );

        // Same stem, different output names
        let docs = ingest(
            vec![
                candidate("a.pdf"),
                candidate("a").with_declared_type("application/pdf"),
            ],
            SelectionOrigin::Files,
        )
        .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_ingest_empty_messages() {
        let err = ingest(vec![candidate("x.doc")], SelectionOrigin::Directory).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No PDF files found in the selected directory"
        );

        let err = ingest(Vec::new(), SelectionOrigin::Files).unwrap_err();
        assert!(matches!(err, StampError::Selection(_)));
        assert_eq!(err.to_string(), "Please select PDF files only");
    }
}
