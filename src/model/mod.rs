//! The trained classifier capability
//!
//! The pipeline only requires something that maps an assembled feature
//! vector to an integer label id: the [`Classifier`] trait. Any ensemble
//! (or non-ensemble) satisfying that contract is acceptable; training
//! happens offline and is not this crate's concern.
//!
//! [`TreeEnsemble`] is the shipped implementation: a forest of serialized
//! decision trees, each a flat node array, combined by majority vote. It
//! is evaluation-only and rides inside the model artifact as plain data.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, StressError, StressResult};

// ============================================================================
// Classifier trait
// ============================================================================

/// An opaque trained model: assembled feature vector in, label id out.
///
/// Implementations must accept columns in exactly the order captured at
/// training time; the artifact's trained column list is authoritative.
pub trait Classifier: Send + Sync {
    /// Predict the encoded label id for one feature vector
    fn predict(&self, features: &[f64]) -> StressResult<usize>;

    /// Number of input features the model was trained on
    fn n_features(&self) -> usize;

    /// Number of target classes
    fn n_classes(&self) -> usize;
}

// ============================================================================
// Decision trees
// ============================================================================

/// One node of a serialized decision tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    /// Internal split: go left when `features[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node voting for a class
    Leaf { class: usize },
}

/// A single decision tree stored as a flat node array, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walk the tree for one feature vector.
    ///
    /// The walk is bounded by the node count; a longer path means the
    /// node array encodes a cycle, which is a corrupt model.
    pub fn predict(&self, features: &[f64]) -> StressResult<usize> {
        let mut index = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).copied().ok_or_else(|| {
                        StressError::new(
                            ErrorCode::FeatureCountMismatch,
                            format!(
                                "Split on feature {} but vector has {} values",
                                feature,
                                features.len()
                            ),
                        )
                    })?;
                    index = if value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(StressError::prediction(format!(
                        "Tree walk reached missing node {}",
                        index
                    )))
                }
            }
        }
        Err(StressError::prediction("Tree walk did not terminate"))
    }

    /// Check node indices and class ids against the ensemble dimensions
    fn validate(&self, n_features: usize, n_classes: usize) -> StressResult<()> {
        if self.nodes.is_empty() {
            return Err(StressError::artifact("Tree has no nodes"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(StressError::artifact(format!(
                            "Node {} splits on feature {} but the model has {} features",
                            i, feature, n_features
                        )));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(StressError::artifact(format!(
                            "Node {} references a child outside the node array",
                            i
                        )));
                    }
                }
                TreeNode::Leaf { class } => {
                    if *class >= n_classes {
                        return Err(StressError::artifact(format!(
                            "Node {} votes for class {} but the model has {} classes",
                            i, class, n_classes
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Ensemble
// ============================================================================

/// A forest of decision trees combined by majority vote.
///
/// Ties break toward the lowest class id, keeping prediction
/// deterministic for any input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Structural validation, run once when the artifact is loaded
    pub fn validate(&self) -> StressResult<()> {
        if self.trees.is_empty() {
            return Err(StressError::artifact("Ensemble has no trees"));
        }
        if self.n_classes == 0 {
            return Err(StressError::artifact("Ensemble declares zero classes"));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, self.n_classes)?;
        }
        Ok(())
    }

    /// Per-class vote counts for one feature vector
    pub fn vote(&self, features: &[f64]) -> StressResult<Vec<usize>> {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let class = tree.predict(features)?;
            // validate() bounds class ids, but a hand-edited artifact may
            // bypass it; guard instead of indexing blindly
            let slot = votes.get_mut(class).ok_or_else(|| {
                StressError::prediction(format!("Tree voted for unknown class {}", class))
            })?;
            *slot += 1;
        }
        Ok(votes)
    }
}

impl Classifier for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> StressResult<usize> {
        if features.len() != self.n_features {
            return Err(StressError::new(
                ErrorCode::FeatureCountMismatch,
                format!(
                    "Model expects {} features, got {}",
                    self.n_features,
                    features.len()
                ),
            ));
        }

        let votes = self.vote(features)?;
        let winner = votes
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
            .map(|(class, _)| class)
            .ok_or_else(|| StressError::prediction("Ensemble produced no votes"))?;
        Ok(winner)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}

// ============================================================================
// Tests
// ============================================================================
