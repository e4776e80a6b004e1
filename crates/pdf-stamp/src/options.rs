use crate::overlay::StampVariant;
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stamping configuration for a whole run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StampOptions {
    // Geometry
    pub variant: StampVariant,

    // Input: either explicit files or a directory to scan
    pub input_files: Vec<PathBuf>,
    pub input_dir: Option<PathBuf>,

    // Output
    pub output_dir: PathBuf,
    pub preview_dir: Option<PathBuf>,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            variant: StampVariant::default(),
            input_files: Vec::new(),
            input_dir: None,
            output_dir: PathBuf::from("."),
            preview_dir: None,
        }
    }
}

impl StampOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| StampError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StampError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Where the selection comes from
    pub fn selection_origin(&self) -> SelectionOrigin {
        if self.input_dir.is_some() {
            SelectionOrigin::Directory
        } else {
            SelectionOrigin::Files
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        match (&self.input_dir, self.input_files.is_empty()) {
            (None, true) => {
                return Err(StampError::Config("No input files specified".to_string()));
            }
            (Some(_), false) => {
                return Err(StampError::Config(
                    "Specify either input files or an input directory, not both".to_string(),
                ));
            }
            _ => {}
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(StampError::Config("No output directory specified".to_string()));
        }

        if self.preview_dir.as_ref() == Some(&self.output_dir) {
            return Err(StampError::Config(
                "Preview and output directories must differ".to_string(),
            ));
        }

        Ok(())
    }
}
