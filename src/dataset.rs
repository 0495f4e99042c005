//! Reference Dataset
//!
//! The agronomy table the lookup predictor and the reconciliation step both
//! read from. Loaded once from CSV at startup and never mutated.

use crate::error::{AdvisorError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const COL_STATE: &str = "State";
pub const COL_SOIL_TYPE: &str = "Soil Type";
pub const COL_RECOMMEND_CROP: &str = "Recommend Crop";
pub const COL_REQUIRED_WATER: &str = "Required Water";
pub const COL_REQUIRED_FERTILIZER: &str = "Required Fertilizer";
pub const COL_PROTECTION_TIP: &str = "Crop Protection Tip";
pub const COL_RESOURCES_TIP: &str = "Limited Resources Tip";
pub const COL_DISEASE_TIP: &str = "Disease Prevention Tip";

/// Columns every dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_STATE,
    COL_SOIL_TYPE,
    COL_RECOMMEND_CROP,
    COL_REQUIRED_WATER,
    COL_REQUIRED_FERTILIZER,
    COL_PROTECTION_TIP,
    COL_RESOURCES_TIP,
    COL_DISEASE_TIP,
];

/// One dataset row, borrowed from the owning dataset.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRow<'a> {
    columns: &'a HashMap<String, usize>,
    values: &'a [String],
}

impl<'a> ReferenceRow<'a> {
    /// Value of `column`, or `None` if the column is unknown or the row is short.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = *self.columns.get(column)?;
        self.values.get(idx).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    headers: Vec<String>,
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl ReferenceDataset {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AdvisorError::Dataset(format!(
                "Reference dataset not found: {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Reference dataset loaded from {} ({} rows)",
            path.display(),
            dataset.len()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| AdvisorError::Dataset(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(|s| s.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for rec in rdr.records() {
            let rec =
                rec.map_err(|e| AdvisorError::Dataset(format!("Failed to read CSV row: {}", e)))?;
            rows.push(rec.iter().map(|s| s.to_string()).collect());
        }

        Self::from_rows(headers, rows)
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut columns = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            // First occurrence wins on duplicated headers
            columns.entry(name.clone()).or_insert(idx);
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !columns.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(AdvisorError::Dataset(format!(
                "Reference dataset is missing columns: {}",
                missing.join(", ")
            )));
        }

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != headers.len()) {
            return Err(AdvisorError::Dataset(format!(
                "Row {} has {} fields, expected {}",
                idx + 1,
                row.len(),
                headers.len()
            )));
        }

        if rows.is_empty() {
            warn!("Reference dataset has no rows; lookup predictions will fail");
        }

        Ok(Self {
            headers,
            columns,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = ReferenceRow<'_>> {
        self.rows.iter().map(move |values| ReferenceRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn first(&self) -> Option<ReferenceRow<'_>> {
        self.rows().next()
    }

    /// First row matching both State and Soil Type exactly.
    pub fn find_by_state_and_soil(
        &self,
        state: &str,
        soil_type: &str,
    ) -> Option<ReferenceRow<'_>> {
        self.rows().find(|row| {
            row.get(COL_STATE) == Some(state) && row.get(COL_SOIL_TYPE) == Some(soil_type)
        })
    }

    /// First row whose Recommend Crop equals `crop`.
    pub fn find_by_crop(&self, crop: &str) -> Option<ReferenceRow<'_>> {
        self.rows().find(|row| row.get(COL_RECOMMEND_CROP) == Some(crop))
    }
}
