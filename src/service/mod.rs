//! The inference service
//!
//! Orchestrates the pipeline into one `predict(record) -> label` call:
//! normalize -> fuzzify -> encode -> assemble -> classify -> decode.
//!
//! The service holds only read-only state loaded once at startup (the
//! artifact and the fill policy); every call is independent and bounded,
//! so batches parallelize with no coordination beyond shared read access.
//! Classifier-internal failures are caught here and translated into a
//! generic prediction error; they never propagate raw to callers.

use serde::Serialize;

use crate::artifact::ModelArtifact;
use crate::encoder::TARGET_COLUMN;
use crate::error::{ErrorCode, StressError, StressResult};
use crate::features::{FeatureAssembler, FillPolicy, RawRecord};
use crate::model::Classifier;

// ============================================================================
// Result type
// ============================================================================

/// The decoded prediction for one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Decoded stress-level label
    pub label: String,
    /// The raw encoded label id the classifier produced
    pub label_id: usize,
    /// Variables whose value fell outside its fuzzy universe. A
    /// diagnostic, not an error
    pub out_of_universe: Vec<&'static str>,
}

// ============================================================================
// Service
// ============================================================================

/// Stateless-per-call prediction over a loaded artifact
pub struct InferenceService {
    artifact: ModelArtifact,
    fill: FillPolicy,
}

impl InferenceService {
    /// Wrap an already-validated artifact with the serving fill policy
    /// (missing numerics become 0).
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            artifact,
            fill: FillPolicy::Zero,
        }
    }

    /// Load the artifact from disk. A failed load is fatal to startup;
    /// callers must not begin serving without a service.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> StressResult<Self> {
        let artifact = ModelArtifact::load(path)?;
        Ok(Self::new(artifact))
    }

    /// Override the fill policy (e.g. median fill for a training-context
    /// re-run over the same pipeline).
    pub fn with_fill_policy(mut self, fill: FillPolicy) -> Self {
        self.fill = fill;
        self
    }

    /// The training-context fill policy carried by this artifact
    pub fn training_fill_policy(&self) -> FillPolicy {
        FillPolicy::Median(self.artifact.medians)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Predict the stress level for one raw record.
    ///
    /// Validation and unknown-category errors surface as-is (client
    /// errors); anything the classifier itself raises is wrapped into
    /// `PredictionFailed` with the cause preserved for logging.
    pub fn predict(&self, record: &RawRecord) -> StressResult<PredictionResult> {
        let assembler =
            FeatureAssembler::new(&self.artifact.encoders, &self.artifact.columns, self.fill);
        let assembled = assembler.assemble(record)?;

        if !assembled.out_of_universe.is_empty() {
            eprintln!(
                "warning: value outside fuzzy universe for: {}",
                assembled.out_of_universe.join(", ")
            );
        }

        let label_id = self
            .artifact
            .ensemble
            .predict(&assembled.values)
            .map_err(|e| {
                StressError::new(ErrorCode::PredictionFailed, "Classifier failed during inference")
                    .with_cause(e.to_string())
            })?;

        let label = self
            .artifact
            .encoders
            .decode(TARGET_COLUMN, label_id)?
            .to_string();

        Ok(PredictionResult {
            label,
            label_id,
            out_of_universe: assembled.out_of_universe,
        })
    }

    /// Score many records independently. Per-record failures do not
    /// abort the batch.
    pub fn predict_batch(&self, records: &[RawRecord]) -> Vec<StressResult<PredictionResult>> {
        records.iter().map(|r| self.predict(r)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ARTIFACT_VERSION;
    use crate::encoder::{EncoderRegistry, LabelEncoder};
    use crate::features::{Medians, NUMERIC_COLUMNS};
    use crate::fuzzy::DEGREE_NAMES;
    use crate::model::{DecisionTree, TreeEnsemble, TreeNode};

    fn trained_columns() -> Vec<String> {
        let mut columns: Vec<String> = vec![
            "Gender".into(),
            "BMI Category".into(),
            "Sleep Disorder".into(),
        ];
        columns.extend(NUMERIC_COLUMNS.iter().map(|c| c.to_string()));
        columns.extend(DEGREE_NAMES.iter().map(|c| c.to_string()));
        columns
    }

    /// Artifact with one stump: Age <= 40 -> "Low", else "High"
    fn sample_artifact() -> ModelArtifact {
        let mut encoders = EncoderRegistry::new();
        encoders.insert("Gender", LabelEncoder::fit(["Female", "Male"]));
        encoders.insert(
            "BMI Category",
            LabelEncoder::fit(["Normal", "Obese", "Overweight"]),
        );
        encoders.insert(
            "Sleep Disorder",
            LabelEncoder::fit(["Insomnia", "Nothing", "Sleep Apnea"]),
        );
        encoders.insert(TARGET_COLUMN, LabelEncoder::fit(["High", "Low", "Medium"]));

        let columns = trained_columns();
        let ensemble = TreeEnsemble {
            n_features: columns.len(),
            n_classes: 3,
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 3, // Age
                        threshold: 40.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { class: 1 }, // "Low"
                    TreeNode::Leaf { class: 0 }, // "High"
                ],
            }],
        };

        ModelArtifact {
            version: ARTIFACT_VERSION,
            columns,
            encoders,
            medians: Medians {
                age: 42.0,
                sleep_duration: 7.2,
                quality_of_sleep: 7.0,
                heart_rate: 70.0,
                daily_steps: 7000.0,
            },
            ensemble,
        }
    }

    fn sample_record() -> RawRecord {
        RawRecord {
            gender: "Male".into(),
            age: Some(33.0),
            sleep_duration: Some(7.5),
            quality_of_sleep: Some(8.0),
            bmi_category: "Normal".into(),
            heart_rate: Some(75.0),
            daily_steps: Some(8000.0),
            sleep_disorder: Some("Nothing".into()),
        }
    }

    #[test]
    fn test_predict_decodes_label() {
        let service = InferenceService::new(sample_artifact());

        let result = service.predict(&sample_record()).unwrap();
        assert_eq!(result.label, "Low");
        assert_eq!(result.label_id, 1);
        assert!(result.out_of_universe.is_empty());

        let mut older = sample_record();
        older.age = Some(55.0);
        assert_eq!(service.predict(&older).unwrap().label, "High");
    }

    #[test]
    fn test_predict_is_deterministic() {
        let service = InferenceService::new(sample_artifact());
        let record = sample_record();
        let first = service.predict(&record).unwrap();
        for _ in 0..10 {
            assert_eq!(service.predict(&record).unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_category_is_client_error() {
        let service = InferenceService::new(sample_artifact());
        let mut record = sample_record();
        record.bmi_category = "Underweight".into();

        let err = service.predict(&record).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownCategory);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_out_of_universe_is_flagged_not_fatal() {
        let service = InferenceService::new(sample_artifact());
        let mut record = sample_record();
        record.heart_rate = Some(150.0);

        let result = service.predict(&record).unwrap();
        assert_eq!(result.out_of_universe, vec!["Heart Rate"]);
    }

    #[test]
    fn test_classifier_failure_translated() {
        // A cyclic tree that validation would normally reject; predict
        // must still fail cleanly, not hang or panic
        let mut artifact = sample_artifact();
        artifact.ensemble.trees = vec![DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: 0,
                right: 0,
            }],
        }];
        let service = InferenceService::new(artifact);

        let err = service.predict(&sample_record()).unwrap_err();
        assert_eq!(err.code, ErrorCode::PredictionFailed);
        assert!(err.is_server_error());
        // Cause preserved for logging
        assert!(!err.context.unwrap().causes.is_empty());
    }

    #[test]
    fn test_batch_isolates_failures() {
        let service = InferenceService::new(sample_artifact());
        let good = sample_record();
        let mut bad = sample_record();
        bad.gender = "".into();

        let results = service.predict_batch(&[good, bad]);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_fill_policy_contexts_share_the_pipeline() {
        let artifact = sample_artifact();
        let mut record = sample_record();
        record.age = None;

        // Serving: fill 0 -> Age 0 <= 40 -> "Low"
        let serving = InferenceService::new(artifact.clone());
        assert_eq!(serving.predict(&record).unwrap().label, "Low");

        // Training medians: Age 42 > 40 -> "High"
        let median_fill = serving.training_fill_policy();
        let training = InferenceService::new(artifact).with_fill_policy(median_fill);
        assert_eq!(training.predict(&record).unwrap().label, "High");
    }
}
