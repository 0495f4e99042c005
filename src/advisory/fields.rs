use crate::dataset::{
    COL_DISEASE_TIP, COL_PROTECTION_TIP, COL_RECOMMEND_CROP, COL_REQUIRED_FERTILIZER,
    COL_REQUIRED_WATER, COL_RESOURCES_TIP,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bumped whenever the labeled-line format shared by the prompt and the parser changes.
pub const ADVISORY_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    RecommendedCrop,
    RequiredWater,
    RequiredFertilizer,
    ProtectionTip,
    ResourceTip,
    DiseaseTip,
}

impl FieldKey {
    pub const ALL: [FieldKey; 6] = [
        FieldKey::RecommendedCrop,
        FieldKey::RequiredWater,
        FieldKey::RequiredFertilizer,
        FieldKey::ProtectionTip,
        FieldKey::ResourceTip,
        FieldKey::DiseaseTip,
    ];

    /// Line label the generative service is told to emit.
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::RecommendedCrop => "Recommended Crop",
            FieldKey::RequiredWater => "Required Water",
            FieldKey::RequiredFertilizer => "Required Fertilizer",
            FieldKey::ProtectionTip => "Crop Protection Tip",
            FieldKey::ResourceTip => "Limited Resources Tip",
            FieldKey::DiseaseTip => "Disease Prevention Tip",
        }
    }

    /// Placeholder shown after the label in the prompt's format section.
    pub fn placeholder(self) -> &'static str {
        match self {
            FieldKey::RecommendedCrop => "[crop name]",
            FieldKey::RequiredWater => "[amount] liters/day",
            FieldKey::RequiredFertilizer => "[fertilizer type]",
            FieldKey::ProtectionTip => "[protection tip]",
            FieldKey::ResourceTip => "[resource tip]",
            FieldKey::DiseaseTip => "[prevention tip]",
        }
    }

    /// Reference dataset column holding the fallback value.
    pub fn column(self) -> &'static str {
        match self {
            FieldKey::RecommendedCrop => COL_RECOMMEND_CROP,
            FieldKey::RequiredWater => COL_REQUIRED_WATER,
            FieldKey::RequiredFertilizer => COL_REQUIRED_FERTILIZER,
            FieldKey::ProtectionTip => COL_PROTECTION_TIP,
            FieldKey::ResourceTip => COL_RESOURCES_TIP,
            FieldKey::DiseaseTip => COL_DISEASE_TIP,
        }
    }

    pub fn from_label(label: &str) -> Option<FieldKey> {
        FieldKey::ALL.iter().copied().find(|k| k.label() == label)
    }
}

/// Advisory values keyed by field; partial until reconciled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryFields {
    values: BTreeMap<FieldKey, String>,
}

impl AdvisoryFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.values.get(&key).map(|s| s.as_str())
    }

    pub fn insert(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn missing(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .iter()
            .copied()
            .filter(|k| !self.contains(*k))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.values.len() == FieldKey::ALL.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
