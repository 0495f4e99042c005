//! Advisory Prompt Builder
//!
//! The format section is the contract [`crate::advisory::parser`] reads back;
//! change both together and bump [`crate::advisory::ADVISORY_FORMAT_VERSION`].

use crate::advisory::parser::SUGGESTIONS_MARKER;
use crate::advisory::FieldKey;
use crate::context::FarmingContext;
use crate::predictor::Prediction;
use crate::presentation::SUGGESTION_CONFIDENCE_THRESHOLD;

pub fn build_prompt(context: &FarmingContext, prediction: &Prediction) -> String {
    let format_lines: Vec<String> = FieldKey::ALL
        .iter()
        .map(|key| format!("{}: {}", key.label(), key.placeholder()))
        .collect();

    format!(
        r#"Given the following agricultural conditions:
State: {}
Soil Type: {}
Previous Crop: {}
Fertilizer Used: {}
Water Hardness: {}
Livestock: {}
Resources: {}
Temperature: {}°C
Rainfall: {} mm
Predicted Crop: {}
Model Confidence: {:.1}%
Provide a detailed recommendation in this format:
{}
If the model confidence is below {}%, provide suggestions:
{}
- [suggestion with **key points** in bold]
- [suggestion with **key points** in bold]"#,
        context.state,
        context.soil_type,
        context.previous_crop,
        context.fertilizer_used,
        context.water_hardness,
        context.livestock,
        context.resources,
        context.temperature,
        context.rainfall,
        prediction.crop_label,
        prediction.confidence_percent,
        format_lines.join("\n"),
        SUGGESTION_CONFIDENCE_THRESHOLD,
        SUGGESTIONS_MARKER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::ADVISORY_FORMAT_VERSION;
    use crate::context::FarmerInput;
    use crate::weather::Weather;

    fn context() -> FarmingContext {
        let input = FarmerInput {
            state: "Punjab".to_string(),
            soil_type: "Loamy".to_string(),
            previous_crop: "Rice".to_string(),
            fertilizer_used: "Urea".to_string(),
            water_hardness: "Hard".to_string(),
            livestock: "Buffalo".to_string(),
            resources: "Tube well".to_string(),
        };
        FarmingContext::new(input, Weather { temperature: 31.4, rainfall_mm: 0.0 })
    }

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = build_prompt(&context(), &Prediction::new("Wheat", 85.0));
        for line in [
            "State: Punjab",
            "Soil Type: Loamy",
            "Previous Crop: Rice",
            "Fertilizer Used: Urea",
            "Water Hardness: Hard",
            "Livestock: Buffalo",
            "Resources: Tube well",
            "Temperature: 31.4°C",
            "Rainfall: 0 mm",
            "Predicted Crop: Wheat",
            "Model Confidence: 85.0%",
        ] {
            assert!(prompt.contains(line), "missing line: {}", line);
        }
    }

    #[test]
    fn test_confidence_one_decimal() {
        let prompt = build_prompt(&context(), &Prediction::new("Rice", 72.46));
        assert!(prompt.contains("Model Confidence: 72.5%"));
    }

    #[test]
    fn test_format_section_lists_every_label() {
        let prompt = build_prompt(&context(), &Prediction::new("Wheat", 85.0));
        for key in FieldKey::ALL {
            assert!(prompt.contains(&format!("{}: {}", key.label(), key.placeholder())));
        }
        assert!(prompt.contains("below 83%"));
        assert!(prompt.contains("\nSuggestions:\n"));
    }

    #[test]
    fn test_format_contract_version() {
        // Editing the labeled-line format means bumping this and the parser together
        assert_eq!(ADVISORY_FORMAT_VERSION, 1);
        let prompt = build_prompt(&context(), &Prediction::new("Wheat", 85.0));
        let format_start = prompt.find("in this format:\n").unwrap();
        let labels: Vec<&str> = prompt[format_start..]
            .lines()
            .skip(1)
            .take(FieldKey::ALL.len())
            .filter_map(|line| line.split_once(':').map(|(label, _)| label))
            .collect();
        let expected: Vec<&str> = FieldKey::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels, expected);
        assert!(prompt.ends_with("- [suggestion with **key points** in bold]"));
    }

    #[test]
    fn test_deterministic() {
        let a = build_prompt(&context(), &Prediction::new("Wheat", 85.0));
        let b = build_prompt(&context(), &Prediction::new("Wheat", 85.0));
        assert_eq!(a, b);
    }
}
