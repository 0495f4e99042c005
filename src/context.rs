use crate::error::{AdvisorError, Result};
use crate::weather::Weather;
use serde::{Deserialize, Serialize};

/// Column names of the categorical fields, in input order.
pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "State",
    "Soil Type",
    "Previous Crop",
    "Fertilizer Used",
    "Water Hardness",
    "Livestock",
    "Resources",
];

/// The seven categorical fields a farmer submits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmerInput {
    pub state: String,
    pub soil_type: String,
    pub previous_crop: String,
    pub fertilizer_used: String,
    pub water_hardness: String,
    pub livestock: String,
    pub resources: String,
}

/// Everything one advisory request is computed from. Built once per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmingContext {
    pub state: String,
    pub soil_type: String,
    pub previous_crop: String,
    pub fertilizer_used: String,
    pub water_hardness: String,
    pub livestock: String,
    pub resources: String,
    pub temperature: f64,
    pub rainfall: f64,
}

impl FarmerInput {
    /// Trimmed copy; every field must be non-empty.
    pub fn normalized(&self) -> Result<FarmerInput> {
        let fields = [
            ("state", &self.state),
            ("soil_type", &self.soil_type),
            ("previous_crop", &self.previous_crop),
            ("fertilizer_used", &self.fertilizer_used),
            ("water_hardness", &self.water_hardness),
            ("livestock", &self.livestock),
            ("resources", &self.resources),
        ];
        let empty: Vec<&str> = fields
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !empty.is_empty() {
            return Err(AdvisorError::InvalidInput(format!(
                "Required fields are empty: {}",
                empty.join(", ")
            )));
        }

        Ok(FarmerInput {
            state: self.state.trim().to_string(),
            soil_type: self.soil_type.trim().to_string(),
            previous_crop: self.previous_crop.trim().to_string(),
            fertilizer_used: self.fertilizer_used.trim().to_string(),
            water_hardness: self.water_hardness.trim().to_string(),
            livestock: self.livestock.trim().to_string(),
            resources: self.resources.trim().to_string(),
        })
    }
}

impl FarmingContext {
    pub fn new(input: FarmerInput, weather: Weather) -> Self {
        Self {
            state: input.state,
            soil_type: input.soil_type,
            previous_crop: input.previous_crop,
            fertilizer_used: input.fertilizer_used,
            water_hardness: input.water_hardness,
            livestock: input.livestock,
            resources: input.resources,
            temperature: weather.temperature,
            rainfall: weather.rainfall_mm,
        }
    }

    /// Categorical value by its dataset/encoder column name.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "State" => Some(&self.state),
            "Soil Type" => Some(&self.soil_type),
            "Previous Crop" => Some(&self.previous_crop),
            "Fertilizer Used" => Some(&self.fertilizer_used),
            "Water Hardness" => Some(&self.water_hardness),
            "Livestock" => Some(&self.livestock),
            "Resources" => Some(&self.resources),
            _ => None,
        }
    }

    /// Numeric value by feature name.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "Temperature" => Some(self.temperature),
            "Rainfall" => Some(self.rainfall),
            _ => None,
        }
    }
}
