//! Frozen categorical label encoding
//!
//! One ordinal encoder per categorical column, built once at training time
//! from the sorted unique labels, then frozen. Encoding an unseen category
//! is an error, never a silent default id; decoding is the exact inverse.
//!
//! The registry is immutable after construction and safe to share across
//! concurrent callers, and it serializes as part of the model artifact so
//! training and serving always agree on the vocabularies.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{StressError, StressResult};

/// Categorical feature columns that get encoded into the feature vector
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["Gender", "BMI Category", "Sleep Disorder"];

/// The target column; its encoder decodes classifier output back to a label
pub const TARGET_COLUMN: &str = "Stress Level";

// ============================================================================
// Label encoder
// ============================================================================

/// A frozen bidirectional mapping between category strings and integer ids.
///
/// Ids are assigned in ascending order over the sorted unique training
/// labels, so `classes[id]` is the decode direction and a linear scan (the
/// vocabularies here have at most a handful of entries) is the encode
/// direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Sorted unique labels; the index of a label is its id
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from training labels: sort unique values, assign
    /// ascending ids starting at 0.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Reconstruct an encoder from an already-frozen class list
    pub fn from_classes(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// The frozen vocabulary, in id order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of labels in the vocabulary
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Encode a label to its frozen id, or `None` if unseen
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    /// Decode an id back to its label, or `None` if out of range
    pub fn inverse_transform(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(String::as_str)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// The frozen per-column encoders: the three categorical feature columns
/// plus the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderRegistry {
    /// Encoders keyed by column name, in insertion order
    encoders: IndexMap<String, LabelEncoder>,
}

impl EncoderRegistry {
    /// Create an empty registry (training-time construction)
    pub fn new() -> Self {
        Self {
            encoders: IndexMap::new(),
        }
    }

    /// Register the encoder for a column. Used only while fitting; the
    /// registry is treated as frozen once it enters an artifact.
    pub fn insert(&mut self, column: impl Into<String>, encoder: LabelEncoder) {
        self.encoders.insert(column.into(), encoder);
    }

    /// Get the encoder for a column
    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    /// Column names with a registered encoder, in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    /// Encode a categorical value for a column.
    ///
    /// Fails with `UnknownCategory` for values outside the frozen
    /// vocabulary and `UnknownColumn` when no encoder exists for the
    /// column.
    pub fn encode(&self, column: &str, value: &str) -> StressResult<usize> {
        let encoder = self
            .encoders
            .get(column)
            .ok_or_else(|| StressError::unknown_column(column))?;
        encoder.transform(value).ok_or_else(|| {
            StressError::unknown_category(column, value).with_hint(format!(
                "Known values: {}",
                encoder.classes().join(", ")
            ))
        })
    }

    /// Decode an id back to its label for a column
    pub fn decode(&self, column: &str, id: usize) -> StressResult<&str> {
        let encoder = self
            .encoders
            .get(column)
            .ok_or_else(|| StressError::unknown_column(column))?;
        encoder.inverse_transform(id).ok_or_else(|| {
            StressError::new(
                crate::error::ErrorCode::UnknownLabelId,
                format!("Label id {} is out of range for column '{}'", id, column),
            )
        })
    }

    /// Validate that the registry covers every categorical feature column
    /// and the target. Called when an artifact is loaded.
    pub fn validate(&self) -> StressResult<()> {
        for column in CATEGORICAL_COLUMNS.into_iter().chain([TARGET_COLUMN]) {
            let encoder = self
                .encoders
                .get(column)
                .ok_or_else(|| StressError::artifact(format!("Missing encoder for column '{}'", column)))?;
            if encoder.is_empty() {
                return Err(StressError::artifact(format!(
                    "Encoder for column '{}' has an empty vocabulary",
                    column
                )));
            }
        }
        Ok(())
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
