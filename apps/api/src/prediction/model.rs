//! Disease classifier: loads the exported training pipeline and label
//! encoder once at startup and runs inference on feature vectors.
//!
//! Artifacts are JSON exports of the trained pipeline:
//!
//! - model: optional standard scaler followed by either a multinomial
//!   logistic regression or a random forest in flat node-array form
//! - label encoder: the ordered class labels
//!
//! Both are immutable after load, so a single `Arc<DiseaseModel>` is shared
//! across all requests.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::prediction::features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};

/// Number of ranked alternatives returned alongside the prediction.
const TOP_K: usize = 3;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Artifact formats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| if *s == 0.0 { x - m } else { (x - m) / s })
            .collect()
    }
}

/// One fitted decision tree. Leaves have `children_left == -1`; a sample
/// goes left when `x[feature] <= threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions).
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize) -> Result<(), ModelError> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(ModelError::Invalid("decision tree has no nodes".into()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(ModelError::Invalid(
                "decision tree node arrays differ in length".into(),
            ));
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if self.value[node].len() != n_classes {
                return Err(ModelError::Invalid(format!(
                    "node {node} has {} class weights, expected {n_classes}",
                    self.value[node].len()
                )));
            }
            if left == -1 && right == -1 {
                continue;
            }
            // Children must point forward, which also rules out cycles.
            let child_ok = |c: i64| c > node as i64 && (c as usize) < n;
            if !child_ok(left) || !child_ok(right) {
                return Err(ModelError::Invalid(format!(
                    "node {node} has out-of-range children"
                )));
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= FEATURE_COUNT {
                return Err(ModelError::Invalid(format!(
                    "node {node} splits on unknown feature {f}"
                )));
            }
        }
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != -1 {
            let f = self.feature[node] as usize;
            node = if row[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        normalize(&self.value[node])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    RandomForest {
        n_classes: usize,
        trees: Vec<DecisionTree>,
    },
}

impl Estimator {
    fn n_classes(&self) -> usize {
        match self {
            // A binary model stores a single decision row.
            Estimator::LogisticRegression { coef, .. } if coef.len() == 1 => 2,
            Estimator::LogisticRegression { coef, .. } => coef.len(),
            Estimator::RandomForest { n_classes, .. } => *n_classes,
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        match self {
            Estimator::LogisticRegression { coef, intercept } => {
                if coef.is_empty() {
                    return Err(ModelError::Invalid("logistic regression has no coefficients".into()));
                }
                if intercept.len() != coef.len() {
                    return Err(ModelError::Invalid(format!(
                        "{} intercepts for {} coefficient rows",
                        intercept.len(),
                        coef.len()
                    )));
                }
                if let Some(row) = coef.iter().find(|row| row.len() != FEATURE_COUNT) {
                    return Err(ModelError::FeatureCount {
                        expected: FEATURE_COUNT,
                        actual: row.len(),
                    });
                }
                Ok(())
            }
            Estimator::RandomForest { n_classes, trees } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("random forest has no trees".into()));
                }
                trees.iter().try_for_each(|t| t.validate(*n_classes))
            }
        }
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        match self {
            Estimator::LogisticRegression { coef, intercept } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(w, b)| w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + b)
                    .collect();
                if scores.len() == 1 {
                    let p = 1.0 / (1.0 + (-scores[0]).exp());
                    vec![1.0 - p, p]
                } else {
                    softmax(&scores)
                }
            }
            Estimator::RandomForest { n_classes, trees } => {
                let mut acc = vec![0.0; *n_classes];
                for tree in trees {
                    for (a, p) in acc.iter_mut().zip(tree.predict_proba(row)) {
                        *a += p;
                    }
                }
                let n = trees.len() as f64;
                acc.into_iter().map(|a| a / n).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    /// Column names seen at fit time; checked against `FEATURE_COLUMNS` when present.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub estimator: Estimator,
}

// ────────────────────────────────────────────────────────────────────────────
// Loaded model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RankedDisease {
    pub disease: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub predicted_disease: String,
    pub class_index: usize,
    /// Probability of the predicted class, in percent.
    pub confidence: f64,
    pub top_predictions: Vec<RankedDisease>,
}

#[derive(Debug)]
pub struct DiseaseModel {
    pipeline: PipelineArtifact,
    encoder: LabelEncoder,
}

impl DiseaseModel {
    pub fn load(model_path: impl AsRef<Path>, encoder_path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let pipeline: PipelineArtifact = read_json(model_path.as_ref())?;
        let encoder: LabelEncoder = read_json(encoder_path.as_ref())?;
        Self::from_parts(pipeline, encoder)
    }

    pub fn from_parts(pipeline: PipelineArtifact, encoder: LabelEncoder) -> Result<Self, ModelError> {
        if let Some(names) = &pipeline.feature_names {
            if names.len() != FEATURE_COUNT || names.iter().zip(FEATURE_COLUMNS).any(|(a, b)| a != b) {
                return Err(ModelError::Invalid(
                    "feature_names do not match the expected column order".into(),
                ));
            }
        }
        if let Some(scaler) = &pipeline.scaler {
            if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
                return Err(ModelError::Invalid(format!(
                    "scaler expects {} features",
                    scaler.mean.len()
                )));
            }
        }
        pipeline.estimator.validate()?;

        let n_classes = pipeline.estimator.n_classes();
        if n_classes != encoder.classes.len() {
            return Err(ModelError::Invalid(format!(
                "estimator has {n_classes} classes but label encoder has {}",
                encoder.classes.len()
            )));
        }

        Ok(Self { pipeline, encoder })
    }

    pub fn classes(&self) -> &[String] {
        &self.encoder.classes
    }

    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let row = features.as_slice();
        if row.len() != FEATURE_COUNT {
            return Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                actual: row.len(),
            });
        }
        let proba = match &self.pipeline.scaler {
            Some(scaler) => self.pipeline.estimator.predict_proba(&scaler.transform(row)),
            None => self.pipeline.estimator.predict_proba(row),
        };
        Ok(proba)
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let proba = self.predict_proba(features)?;

        // First maximum wins, matching argmax tie-breaking.
        let class_index = proba
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > proba[best] { i } else { best });

        let predicted_disease = self
            .encoder
            .inverse_transform(class_index)
            .ok_or_else(|| ModelError::Invalid(format!("class index {class_index} out of range")))?
            .to_string();

        let mut ranked: Vec<(usize, f64)> = proba.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let top_predictions = ranked
            .into_iter()
            .take(TOP_K)
            .map(|(i, p)| RankedDisease {
                disease: self.encoder.classes[i].clone(),
                probability: p,
            })
            .collect();

        debug!("Predicted {predicted_disease} (class {class_index})");

        Ok(Prediction {
            predicted_disease,
            class_index,
            confidence: proba[class_index] * 100.0,
            top_predictions,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn normalize(weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return vec![1.0 / weights.len() as f64; weights.len()];
    }
    weights.iter().map(|w| w / sum).collect()
}
