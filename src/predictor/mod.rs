//! Crop Predictor
//!
//! One contract, two interchangeable backends. Which backend runs is decided
//! once when the [`crate::pipeline::Advisor`] is built.

pub mod classifier;
pub mod lookup;

use crate::context::FarmingContext;
use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use classifier::{ClassifierPredictor, LabelEncoder, TreeEnsemble};
pub use lookup::LookupPredictor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub crop_label: String,
    /// Always within [0, 100].
    pub confidence_percent: f64,
}

impl Prediction {
    pub fn new(crop_label: impl Into<String>, confidence_percent: f64) -> Self {
        Self {
            crop_label: crop_label.into(),
            confidence_percent: confidence_percent.clamp(0.0, 100.0),
        }
    }
}

/// Prediction backend trait - all strategies must implement this
pub trait CropPredictor: Send + Sync {
    /// Strategy name (e.g., "lookup", "classifier")
    fn name(&self) -> &'static str;

    fn predict(&self, context: &FarmingContext) -> Result<Prediction>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    Lookup,
    Classifier,
}

impl FromStr for PredictorKind {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lookup" => Ok(PredictorKind::Lookup),
            "classifier" => Ok(PredictorKind::Classifier),
            other => Err(AdvisorError::Config(format!(
                "Unknown predictor '{}', expected 'lookup' or 'classifier'",
                other
            ))),
        }
    }
}
