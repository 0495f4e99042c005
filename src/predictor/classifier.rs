//! Classifier Predictor
//!
//! Runs a pre-trained decision-tree ensemble exported to JSON. Categorical
//! inputs go through per-column label encoders; the predicted class index is
//! decoded back to a crop name with the target encoder.
//!
//! Artifact layout:
//! - model: `{"features": [...], "n_classes": N, "trees": [{"nodes": [...]}]}`
//!   where each node is `{"kind": "split", "feature", "threshold", "left", "right"}`
//!   or `{"kind": "leaf", "distribution": [...]}` and node 0 is the root.
//! - encoders: `{"<column>": {"classes": [...], "default": k}, ...}` including
//!   one entry for the target column `Recommend Crop`.

use super::{CropPredictor, Prediction};
use crate::context::{FarmingContext, CATEGORICAL_COLUMNS};
use crate::dataset::COL_RECOMMEND_CROP;
use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const NUMERIC_FEATURES: [&str; 2] = ["Temperature", "Rainfall"];

/// String <-> integer code mapping for one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
    /// Code substituted for values never seen during training.
    pub default: usize,
}

impl LabelEncoder {
    pub fn encode(&self, value: &str) -> usize {
        self.classes
            .iter()
            .position(|c| c == value)
            .unwrap_or(self.default)
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(|s| s.as_str())
    }

    pub fn knows(&self, value: &str) -> bool {
        self.classes.iter().any(|c| c == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Normalized class distribution of the leaf `x` lands in.
    fn leaf_distribution(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).copied().ok_or_else(|| {
                        AdvisorError::Prediction(format!("Feature index {} out of range", feature))
                    })?;
                    idx = if value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { distribution }) => {
                    let total: f64 = distribution.iter().sum();
                    if !(total.is_finite() && total > 0.0) {
                        return Err(AdvisorError::Prediction(format!(
                            "Leaf {} has no usable class weights",
                            idx
                        )));
                    }
                    return Ok(distribution.iter().map(|w| w / total).collect());
                }
                None => {
                    return Err(AdvisorError::Prediction(format!("Node {} does not exist", idx)));
                }
            }
        }
    }
}

/// Averaged-probability tree ensemble (random-forest style).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub features: Vec<String>,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(serde_json::from_str(&read_artifact(path)?)?)
    }

    /// Structural checks so inference always terminates.
    pub fn validate(&self) -> Result<()> {
        if self.n_classes == 0 {
            return Err(AdvisorError::Prediction("Model declares zero classes".to_string()));
        }
        if self.trees.is_empty() {
            return Err(AdvisorError::Prediction("Model has no trees".to_string()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(AdvisorError::Prediction(format!("Tree {} has no nodes", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.features.len() {
                            return Err(AdvisorError::Prediction(format!(
                                "Tree {} node {} splits on unknown feature {}",
                                t, i, feature
                            )));
                        }
                        if threshold.is_nan() {
                            return Err(AdvisorError::Prediction(format!(
                                "Tree {} node {} has a NaN threshold",
                                t, i
                            )));
                        }
                        // Children must point forward, which rules out cycles
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(AdvisorError::Prediction(format!(
                                    "Tree {} node {} has invalid child {}",
                                    t, i, child
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { distribution } => {
                        if distribution.len() != self.n_classes {
                            return Err(AdvisorError::Prediction(format!(
                                "Tree {} leaf {} has {} weights, expected {}",
                                t,
                                i,
                                distribution.len(),
                                self.n_classes
                            )));
                        }
                        if distribution.iter().any(|w| !w.is_finite() || *w < 0.0) {
                            return Err(AdvisorError::Prediction(format!(
                                "Tree {} leaf {} has negative or non-finite weights",
                                t, i
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Mean of the per-tree leaf distributions.
    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut probs = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let dist = tree.leaf_distribution(x)?;
            for (p, d) in probs.iter_mut().zip(dist) {
                *p += d;
            }
        }
        let n = self.trees.len() as f64;
        Ok(probs.into_iter().map(|p| p / n).collect())
    }
}

pub fn load_encoders(path: &Path) -> Result<HashMap<String, LabelEncoder>> {
    Ok(serde_json::from_str(&read_artifact(path)?)?)
}

fn read_artifact(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(AdvisorError::Prediction(format!(
            "Classifier artifact not found: {}",
            path.display()
        )));
    }
    let mut f = File::open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    Ok(s)
}

enum FeatureSource {
    Numeric(&'static str),
    Categorical { column: String, encoder: LabelEncoder },
}

pub struct ClassifierPredictor {
    model: TreeEnsemble,
    sources: Vec<FeatureSource>,
    target: LabelEncoder,
}

impl std::fmt::Debug for ClassifierPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierPredictor")
            .field("features", &self.model.features)
            .field("trees", &self.model.trees.len())
            .field("classes", &self.target.classes.len())
            .finish()
    }
}

impl ClassifierPredictor {
    pub fn load(model_path: &Path, encoders_path: &Path) -> Result<Self> {
        let model = TreeEnsemble::load(model_path)?;
        let encoders = load_encoders(encoders_path)?;
        let predictor = Self::new(model, encoders)?;
        info!(
            "Classifier loaded from {} ({} trees, {} classes)",
            model_path.display(),
            predictor.model.trees.len(),
            predictor.model.n_classes
        );
        Ok(predictor)
    }

    pub fn new(model: TreeEnsemble, mut encoders: HashMap<String, LabelEncoder>) -> Result<Self> {
        model.validate()?;

        for (column, encoder) in &encoders {
            if encoder.classes.is_empty() || encoder.default >= encoder.classes.len() {
                return Err(AdvisorError::Prediction(format!(
                    "Encoder for '{}' has default code {} outside its {} classes",
                    column,
                    encoder.default,
                    encoder.classes.len()
                )));
            }
        }

        let target = encoders.remove(COL_RECOMMEND_CROP).ok_or_else(|| {
            AdvisorError::Prediction(format!(
                "No encoder for target column '{}'",
                COL_RECOMMEND_CROP
            ))
        })?;
        if target.classes.len() != model.n_classes {
            return Err(AdvisorError::Prediction(format!(
                "Target encoder has {} classes but model predicts {}",
                target.classes.len(),
                model.n_classes
            )));
        }

        let mut sources = Vec::with_capacity(model.features.len());
        for name in &model.features {
            if let Some(numeric) = NUMERIC_FEATURES.iter().copied().find(|n| *n == name.as_str()) {
                sources.push(FeatureSource::Numeric(numeric));
                continue;
            }
            if !CATEGORICAL_COLUMNS.contains(&name.as_str()) {
                return Err(AdvisorError::Prediction(format!(
                    "Model uses unknown feature '{}'",
                    name
                )));
            }
            let encoder = encoders.get(name).cloned().ok_or_else(|| {
                AdvisorError::Prediction(format!("No encoder for feature '{}'", name))
            })?;
            sources.push(FeatureSource::Categorical {
                column: name.clone(),
                encoder,
            });
        }

        Ok(Self {
            model,
            sources,
            target,
        })
    }

    fn feature_vector(&self, context: &FarmingContext) -> Vec<f64> {
        self.sources
            .iter()
            .map(|source| match source {
                FeatureSource::Numeric(name) => context.numeric(name).unwrap_or(0.0),
                FeatureSource::Categorical { column, encoder } => {
                    let value = context.categorical(column).unwrap_or_default();
                    if !encoder.knows(value) {
                        debug!(
                            "Unseen value '{}' for {}, using default class '{}'",
                            value,
                            column,
                            encoder.decode(encoder.default).unwrap_or_default()
                        );
                    }
                    encoder.encode(value) as f64
                }
            })
            .collect()
    }
}

impl CropPredictor for ClassifierPredictor {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn predict(&self, context: &FarmingContext) -> Result<Prediction> {
        let x = self.feature_vector(context);
        let probs = self.model.predict_proba(&x)?;

        let (best, max_prob) = probs
            .iter()
            .copied()
            .enumerate()
            .fold(None, |acc: Option<(usize, f64)>, (i, p)| match acc {
                Some((_, best_p)) if best_p >= p => acc,
                _ => Some((i, p)),
            })
            .ok_or_else(|| AdvisorError::Prediction("Empty probability distribution".to_string()))?;
        if !max_prob.is_finite() {
            return Err(AdvisorError::Prediction("Non-finite class probability".to_string()));
        }

        let crop = self.target.decode(best).ok_or_else(|| {
            AdvisorError::Prediction(format!("Predicted class {} has no crop label", best))
        })?;
        info!("Recommended crop: {}, Confidence: {:.1}%", crop, max_prob * 100.0);
        Ok(Prediction::new(crop, max_prob * 100.0))
    }
}
