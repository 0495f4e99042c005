use super::fields::AdvisoryFields;
use crate::dataset::ReferenceDataset;
use crate::error::{AdvisorError, Result};
use tracing::{debug, info};

/// Fill every missing field from the first dataset row for `predicted_crop`.
///
/// Complete input is returned as-is without touching the dataset. A crop
/// with no dataset row is a [`AdvisorError::DataIntegrity`] failure.
pub fn complete(
    mut fields: AdvisoryFields,
    predicted_crop: &str,
    dataset: &ReferenceDataset,
) -> Result<AdvisoryFields> {
    let missing = fields.missing();
    if missing.is_empty() {
        debug!("Advisory fields complete, no reconciliation needed");
        return Ok(fields);
    }

    let row = dataset.find_by_crop(predicted_crop).ok_or_else(|| {
        AdvisorError::DataIntegrity(format!(
            "Predicted crop '{}' not found in reference dataset",
            predicted_crop
        ))
    })?;

    for key in &missing {
        let value = row.get(key.column()).unwrap_or_default();
        fields.insert(*key, value);
    }
    info!(
        "Filled {} advisory field(s) from dataset row for {}: {:?}",
        missing.len(),
        predicted_crop,
        missing
    );
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::fields::FieldKey;

    const CSV: &str = "State,Soil Type,Recommend Crop,Required Water,Required Fertilizer,Crop Protection Tip,Limited Resources Tip,Disease Prevention Tip\n\
Punjab,Loamy,Wheat,450,Urea,Use mulch,Drip irrigation,Rotate crops\n\
Haryana,Loamy,Wheat,500,NPK,Hand weeding,Mulch,Resistant varieties\n";

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::from_reader(CSV.as_bytes()).unwrap()
    }

    fn full() -> AdvisoryFields {
        let mut f = AdvisoryFields::new();
        for key in FieldKey::ALL {
            f.insert(key, format!("llm {}", key.label()));
        }
        f
    }

    #[test]
    fn test_fills_missing_from_first_matching_row() {
        let mut f = AdvisoryFields::new();
        f.insert(FieldKey::RecommendedCrop, "Wheat");
        f.insert(FieldKey::RequiredWater, "400 liters/day");

        let done = complete(f, "Wheat", &dataset()).unwrap();
        assert!(done.is_complete());
        assert_eq!(done.get(FieldKey::RequiredWater), Some("400 liters/day"));
        assert_eq!(done.get(FieldKey::RequiredFertilizer), Some("Urea"));
        assert_eq!(done.get(FieldKey::DiseaseTip), Some("Rotate crops"));
    }

    #[test]
    fn test_empty_fields_fully_repaired() {
        let done = complete(AdvisoryFields::new(), "Wheat", &dataset()).unwrap();
        assert_eq!(done.get(FieldKey::RecommendedCrop), Some("Wheat"));
        assert_eq!(done.get(FieldKey::RequiredWater), Some("450"));
    }

    #[test]
    fn test_complete_fields_skip_lookup() {
        // "Millet" is not in the dataset, so any lookup would fail
        let done = complete(full(), "Millet", &dataset()).unwrap();
        assert_eq!(done, full());
    }

    #[test]
    fn test_idempotent() {
        let once = complete(AdvisoryFields::new(), "Wheat", &dataset()).unwrap();
        let twice = complete(once.clone(), "Wheat", &dataset()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_crop_is_integrity_error() {
        match complete(AdvisoryFields::new(), "Millet", &dataset()) {
            Err(AdvisorError::DataIntegrity(msg)) => assert!(msg.contains("Millet")),
            other => panic!("expected data integrity error, got {:?}", other),
        }
    }
}
