//! Raw record normalization and feature vector assembly
//!
//! The one shared pipeline used by both training and serving, so the two
//! contexts produce bit-for-bit identical feature vectors:
//!
//! 1. Normalize categorical aliases (`"Normal Weight"` -> `"Normal"`,
//!    missing Sleep Disorder -> `"Nothing"`)
//! 2. Coerce the 5 numeric attributes; non-parseable values become missing
//!    and are filled per the active [`FillPolicy`]
//! 3. Fuzzify into the 14 membership degrees
//! 4. Encode the 3 categorical columns through the frozen registry
//! 5. Concatenate `[encoded categoricals][raw numerics][fuzzy degrees]`
//! 6. Reindex to the classifier's frozen trained column list (absent
//!    columns fill with 0, extra columns drop, order matches exactly)

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::encoder::{EncoderRegistry, CATEGORICAL_COLUMNS};
use crate::error::{StressError, StressResult};
use crate::fuzzy::{fuzzify, NumericInputs};

/// Numeric feature columns, in dataset order
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "Age",
    "Sleep Duration",
    "Quality of Sleep",
    "Heart Rate",
    "Daily Steps",
];

/// Placeholder label for a missing Sleep Disorder value
pub const NO_DISORDER: &str = "Nothing";

// ============================================================================
// Raw record
// ============================================================================

/// One raw input record, named after the dataset columns.
///
/// Numeric fields are lenient on deserialization: numbers and numeric
/// strings parse, anything else (null, text, absent) becomes missing and
/// is later filled per the active fill policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age", default, deserialize_with = "lenient_f64")]
    pub age: Option<f64>,
    #[serde(rename = "Sleep Duration", default, deserialize_with = "lenient_f64")]
    pub sleep_duration: Option<f64>,
    #[serde(rename = "Quality of Sleep", default, deserialize_with = "lenient_f64")]
    pub quality_of_sleep: Option<f64>,
    #[serde(rename = "BMI Category")]
    pub bmi_category: String,
    #[serde(rename = "Heart Rate", default, deserialize_with = "lenient_f64")]
    pub heart_rate: Option<f64>,
    #[serde(rename = "Daily Steps", default, deserialize_with = "lenient_f64")]
    pub daily_steps: Option<f64>,
    #[serde(rename = "Sleep Disorder", default)]
    pub sleep_disorder: Option<String>,
}

/// Accept a number or a numeric string; anything else is missing
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_numeric(&value))
}

/// Coerce a JSON value to f64, `None` when non-parseable
pub fn coerce_numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl RawRecord {
    /// Apply the categorical alias normalizations in place.
    ///
    /// `"Normal Weight"` folds into `"Normal"` (the dataset carries both
    /// spellings for the same BMI category); a missing or empty Sleep
    /// Disorder becomes the explicit `"Nothing"` label.
    pub fn normalize(&mut self) {
        if self.bmi_category == "Normal Weight" {
            self.bmi_category = "Normal".to_string();
        }
        match &self.sleep_disorder {
            Some(s) if !s.trim().is_empty() => {}
            _ => self.sleep_disorder = Some(NO_DISORDER.to_string()),
        }
    }

    /// Reject records that cannot enter the pipeline at all
    pub fn validate(&self) -> StressResult<()> {
        if self.gender.trim().is_empty() {
            return Err(StressError::missing_field("Gender"));
        }
        if self.bmi_category.trim().is_empty() {
            return Err(StressError::missing_field("BMI Category"));
        }
        Ok(())
    }
}

// ============================================================================
// Fill policy
// ============================================================================

/// Per-column training medians for the median fill policy.
///
/// Captured at training time and persisted in the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Medians {
    pub age: f64,
    pub sleep_duration: f64,
    pub quality_of_sleep: f64,
    pub heart_rate: f64,
    pub daily_steps: f64,
}

/// Median of a sample; `None` for an empty slice. Interpolates the two
/// middle values for even-length samples.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// How missing numeric attributes are filled.
///
/// Training fills with the per-column median; serving fills with 0. The
/// asymmetry is an explicit policy selected by context instead of being
/// baked into either path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum FillPolicy {
    /// Serving context: missing numerics become 0
    Zero,
    /// Training context: missing numerics take the per-column median
    Median(Medians),
}

impl FillPolicy {
    fn fill(&self, column: &str, value: Option<f64>) -> f64 {
        if let Some(v) = value {
            return v;
        }
        match self {
            FillPolicy::Zero => 0.0,
            FillPolicy::Median(m) => match column {
                "Age" => m.age,
                "Sleep Duration" => m.sleep_duration,
                "Quality of Sleep" => m.quality_of_sleep,
                "Heart Rate" => m.heart_rate,
                "Daily Steps" => m.daily_steps,
                _ => 0.0,
            },
        }
    }
}

// ============================================================================
// Assembler
// ============================================================================

/// The feature vector reindexed to the frozen trained column order
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledVector {
    /// Values in exactly the trained column order
    pub values: Vec<f64>,
    /// Variables whose numeric input fell outside its fuzzy universe
    pub out_of_universe: Vec<&'static str>,
}

/// Assembles raw records into classifier-ready feature vectors.
///
/// Holds only shared read-only state (the frozen registry, the trained
/// column list and the fill policy), so one assembler serves concurrent
/// callers and batches without coordination.
#[derive(Debug, Clone)]
pub struct FeatureAssembler<'a> {
    registry: &'a EncoderRegistry,
    columns: &'a [String],
    fill: FillPolicy,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(registry: &'a EncoderRegistry, columns: &'a [String], fill: FillPolicy) -> Self {
        Self {
            registry,
            columns,
            fill,
        }
    }

    /// The frozen trained column order this assembler targets
    pub fn columns(&self) -> &[String] {
        self.columns
    }

    /// Run the full pipeline for one record.
    ///
    /// Validation and unknown-category failures surface here,
    /// synchronously, before anything reaches the classifier.
    pub fn assemble(&self, record: &RawRecord) -> StressResult<AssembledVector> {
        record.validate()?;

        let mut record = record.clone();
        record.normalize();

        // Coerced numerics, filled per policy
        let numerics = NumericInputs {
            age: self.fill.fill("Age", record.age),
            sleep_duration: self.fill.fill("Sleep Duration", record.sleep_duration),
            quality_of_sleep: self.fill.fill("Quality of Sleep", record.quality_of_sleep),
            heart_rate: self.fill.fill("Heart Rate", record.heart_rate),
            daily_steps: self.fill.fill("Daily Steps", record.daily_steps),
        };

        let fuzzy = fuzzify(&numerics);

        // Named record: [encoded categoricals][raw numerics][fuzzy degrees]
        let mut named: IndexMap<&str, f64> = IndexMap::with_capacity(3 + 5 + fuzzy.degrees.len());

        let sleep_disorder = record.sleep_disorder.as_deref().unwrap_or(NO_DISORDER);
        let categorical_values = [
            record.gender.as_str(),
            record.bmi_category.as_str(),
            sleep_disorder,
        ];
        for (column, value) in CATEGORICAL_COLUMNS.into_iter().zip(categorical_values) {
            let id = self.registry.encode(column, value)?;
            named.insert(column, id as f64);
        }

        named.insert("Age", numerics.age);
        named.insert("Sleep Duration", numerics.sleep_duration);
        named.insert("Quality of Sleep", numerics.quality_of_sleep);
        named.insert("Heart Rate", numerics.heart_rate);
        named.insert("Daily Steps", numerics.daily_steps);

        for (name, degree) in fuzzy.named() {
            named.insert(name, degree);
        }

        // Reindex to the frozen trained order: fill 0, drop extras
        let values = self
            .columns
            .iter()
            .map(|column| named.get(column.as_str()).copied().unwrap_or(0.0))
            .collect();

        Ok(AssembledVector {
            values,
            out_of_universe: fuzzy.out_of_universe,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
