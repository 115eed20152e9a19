//! Pipeline configuration
//!
//! Built once at the top level (JSON file, then CLI overrides) and passed
//! down to every stage by reference.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaError};

/// Default name of the voice-line folder looked up under the project root
pub const DEFAULT_VA_FOLDER: &str = "importva";

/// Default waveform extensions (matched case-insensitively)
pub const DEFAULT_EXTENSIONS: &[&str] = &["wav"];

/// Which stages run. Each toggle gates its stage independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageToggles {
    pub import: bool,
    pub sort: bool,
    pub glue: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        StageToggles {
            import: true,
            sort: true,
            glue: true,
        }
    }
}

/// Importer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Name of the folder holding one subfolder per character
    pub va_folder: String,
    /// File extensions, without the leading dot
    pub extensions: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            va_folder: DEFAULT_VA_FOLDER.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ImportConfig {
    /// Check whether a file name carries one of the waveform extensions.
    /// The rest of the name may be any bytes the filesystem allows.
    pub fn is_waveform(&self, file_name: impl AsRef<Path>) -> bool {
        file_name
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Top-level configuration for one pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub stages: StageToggles,
    pub import: ImportConfig,
    /// Select every clip in the session before gluing. When false the glue
    /// stage works on whatever the session already has selected.
    pub select_all_before_glue: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            stages: StageToggles::default(),
            import: ImportConfig::default(),
            select_all_before_glue: true,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the importer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.import.va_folder.trim().is_empty() {
            return Err(VaError::InvalidConfig {
                reason: "va_folder must not be empty".to_string(),
            });
        }
        if self.import.extensions.is_empty() {
            return Err(VaError::InvalidConfig {
                reason: "at least one waveform extension is required".to_string(),
            });
        }
        if let Some(bad) = self
            .import
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(VaError::InvalidConfig {
                reason: format!("extension '{}' must be non-empty and have no leading dot", bad),
            });
        }
        Ok(())
    }
}
