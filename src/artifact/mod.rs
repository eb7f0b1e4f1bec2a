//! The trained model artifact bundle
//!
//! Everything serving needs to reproduce training-time behavior rides in
//! one JSON document: the frozen trained column order, the per-column
//! encoder vocabularies, the training medians for the median fill policy,
//! and the tree ensemble itself.
//!
//! Loading validates structural compatibility up front; a bad artifact is
//! fatal at startup and the process must not begin serving. The trained
//! column list is stored as explicit data with the same authority as the
//! ensemble itself, so assembly never has to infer it from the model.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoder::{EncoderRegistry, TARGET_COLUMN};
use crate::error::{ErrorCode, StressError, StressResult};
use crate::features::Medians;
use crate::model::TreeEnsemble;

/// Current artifact format version
pub const ARTIFACT_VERSION: u32 = 1;

// ============================================================================
// Artifact
// ============================================================================

/// The loadable model bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact format version
    pub version: u32,
    /// The frozen trained column order; authoritative for assembly
    pub columns: Vec<String>,
    /// Frozen categorical vocabularies (features + target)
    pub encoders: EncoderRegistry,
    /// Per-column training medians for the median fill policy
    pub medians: Medians,
    /// The trained classifier
    pub ensemble: TreeEnsemble,
}

impl ModelArtifact {
    /// Load and validate an artifact from disk.
    ///
    /// Any failure (missing file, undeserializable JSON, structural
    /// incompatibility) means the artifact cannot be served.
    pub fn load(path: impl AsRef<Path>) -> StressResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            StressError::from(e)
                .with_context("path", path.display().to_string())
                .with_hint("Pass --artifact or set model.artifact_path in the config")
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&data)
            .map_err(|e| StressError::from(e).with_context("path", path.display().to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Persist the artifact as pretty JSON (the training collaborator's
    /// export path).
    pub fn save(&self, path: impl AsRef<Path>) -> StressResult<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StressError::internal(e.to_string()))?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Structural compatibility checks.
    ///
    /// The column list, encoder vocabularies and ensemble dimensions must
    /// agree with each other before a single prediction is attempted.
    pub fn validate(&self) -> StressResult<()> {
        if self.version != ARTIFACT_VERSION {
            return Err(StressError::artifact(format!(
                "Unsupported artifact version {} (expected {})",
                self.version, ARTIFACT_VERSION
            )));
        }
        if self.columns.is_empty() {
            return Err(StressError::column_mismatch("Trained column list is empty"));
        }

        self.encoders.validate()?;
        self.ensemble.validate()?;

        if self.ensemble.n_features != self.columns.len() {
            return Err(StressError::new(
                ErrorCode::ColumnMismatch,
                format!(
                    "Ensemble expects {} features but the column list has {}",
                    self.ensemble.n_features,
                    self.columns.len()
                ),
            ));
        }

        let target = self
            .encoders
            .get(TARGET_COLUMN)
            .ok_or_else(|| StressError::artifact("Missing target encoder"))?;
        if self.ensemble.n_classes != target.len() {
            return Err(StressError::new(
                ErrorCode::ColumnMismatch,
                format!(
                    "Ensemble predicts {} classes but '{}' has {} labels",
                    self.ensemble.n_classes,
                    TARGET_COLUMN,
                    target.len()
                ),
            ));
        }

        Ok(())
    }

    /// Human-readable artifact summary for `/stats` and `inspect`
    pub fn summary(&self) -> ArtifactSummary {
        let classes = self
            .encoders
            .get(TARGET_COLUMN)
            .map(|e| e.classes().to_vec())
            .unwrap_or_default();
        ArtifactSummary {
            version: self.version,
            column_count: self.columns.len(),
            tree_count: self.ensemble.trees.len(),
            classes,
        }
    }
}

/// Summary of a loaded artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub version: u32,
    pub column_count: usize,
    pub tree_count: usize,
    pub classes: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
