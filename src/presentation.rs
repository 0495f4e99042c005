//! Presentation Assembler

use crate::advisory::{AdvisoryFields, FieldKey};
use crate::context::FarmingContext;
use crate::predictor::Prediction;
use serde::{Deserialize, Serialize};

/// Suggestions are surfaced only below this confidence.
pub const SUGGESTION_CONFIDENCE_THRESHOLD: f64 = 83.0;

pub const ICON_NEXT_CROP: &str = "🌾";
pub const ICON_WEATHER: &str = "☁️";
pub const ICON_WATER: &str = "💧";
pub const ICON_FERTILIZER: &str = "🌿";
pub const ICON_PROTECTION: &str = "🛡️";
pub const ICON_RESOURCES: &str = "♻️";
pub const ICON_DISEASE: &str = "🩺";
pub const ICON_ACCURACY: &str = "📊";
pub const ICON_SUGGESTION: &str = "💡";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationItem {
    pub icon: String,
    pub label: String,
    pub value: String,
}

impl PresentationItem {
    fn new(icon: &str, label: &str, value: impl Into<String>) -> Self {
        Self {
            icon: icon.to_string(),
            label: label.to_string(),
            value: value.into(),
        }
    }
}

pub fn weather_summary(context: &FarmingContext) -> String {
    format!("{}°C, {} mm rainfall", context.temperature, context.rainfall)
}

pub fn suggestions_visible(prediction: &Prediction) -> bool {
    prediction.confidence_percent < SUGGESTION_CONFIDENCE_THRESHOLD
}

/// Seven items in display order plus the suggestions that should be shown.
pub fn assemble(
    context: &FarmingContext,
    prediction: &Prediction,
    fields: &AdvisoryFields,
    suggestions: Vec<String>,
) -> (Vec<PresentationItem>, Vec<String>) {
    let value = |key: FieldKey| fields.get(key).unwrap_or_default().to_string();

    let items = vec![
        PresentationItem::new(ICON_NEXT_CROP, "Next Crop", value(FieldKey::RecommendedCrop)),
        PresentationItem::new(ICON_WEATHER, "Current Weather", weather_summary(context)),
        PresentationItem::new(ICON_WATER, "Water Needed", value(FieldKey::RequiredWater)),
        PresentationItem::new(
            ICON_FERTILIZER,
            "Fertilizer Needed",
            value(FieldKey::RequiredFertilizer),
        ),
        PresentationItem::new(ICON_PROTECTION, "Protect Crops", value(FieldKey::ProtectionTip)),
        PresentationItem::new(ICON_RESOURCES, "Limited Resources", value(FieldKey::ResourceTip)),
        PresentationItem::new(ICON_DISEASE, "Disease Prevention Tip", value(FieldKey::DiseaseTip)),
    ];

    let visible = if suggestions_visible(prediction) {
        suggestions
    } else {
        Vec::new()
    };

    (items, visible)
}
