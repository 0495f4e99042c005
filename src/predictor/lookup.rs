use super::{CropPredictor, Prediction};
use crate::context::FarmingContext;
use crate::dataset::{ReferenceDataset, COL_RECOMMEND_CROP};
use crate::error::{AdvisorError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Placeholder confidence for an exact (State, Soil Type) match.
pub const MATCH_CONFIDENCE: f64 = 85.0;
/// Placeholder confidence when falling back to the first dataset row.
pub const FALLBACK_CONFIDENCE: f64 = 75.0;

/// Exact-match predictor over the reference dataset.
pub struct LookupPredictor {
    dataset: Arc<ReferenceDataset>,
}

impl LookupPredictor {
    pub fn new(dataset: Arc<ReferenceDataset>) -> Self {
        Self { dataset }
    }
}

impl CropPredictor for LookupPredictor {
    fn name(&self) -> &'static str {
        "lookup"
    }

    fn predict(&self, context: &FarmingContext) -> Result<Prediction> {
        if let Some(row) = self
            .dataset
            .find_by_state_and_soil(&context.state, &context.soil_type)
        {
            let crop = row.get(COL_RECOMMEND_CROP).unwrap_or_default();
            info!("Recommended crop: {}, Confidence: {}%", crop, MATCH_CONFIDENCE);
            return Ok(Prediction::new(crop, MATCH_CONFIDENCE));
        }

        let first = self.dataset.first().ok_or_else(|| {
            AdvisorError::Prediction("Reference dataset is empty, no default crop".to_string())
        })?;
        let crop = first.get(COL_RECOMMEND_CROP).unwrap_or_default();
        warn!(
            "No match for {}/{}, defaulting to: {}",
            context.state, context.soil_type, crop
        );
        Ok(Prediction::new(crop, FALLBACK_CONFIDENCE))
    }
}
