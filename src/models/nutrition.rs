use serde::{Deserialize, Serialize};

use crate::models::job::JobStatus;

/// One detected food item in canonical form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionItem {
    pub food_name: String,
    pub mass_g: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ml: Option<f64>,
    pub total_calories: f64,
}

/// Totals for the whole meal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionSummary {
    pub total_food_volume_ml: f64,
    pub total_mass_g: f64,
    pub total_calories_kcal: f64,
    pub num_food_items: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentedImage {
    pub frame: String,
    pub url: String,
    pub key: String,
}

/// Presigned links to segmentation overlays and masks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SegmentedImages {
    #[serde(default)]
    pub overlay_urls: Vec<SegmentedImage>,
    #[serde(default)]
    pub mask_urls: Vec<SegmentedImage>,
}

/// Result document for a finished job, always in canonical shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionAnalysisResult {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmented_images: Option<SegmentedImages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_summary: Option<NutritionSummary>,
    #[serde(default)]
    pub items: Vec<NutritionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_results: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NutritionAnalysisResult {
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Calories from the summary when present, otherwise summed over items.
    pub fn total_calories(&self) -> f64 {
        match &self.nutrition_summary {
            Some(summary) => summary.total_calories_kcal,
            None => self.items.iter().map(|item| item.total_calories).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_volume_is_omitted_not_null() {
        let item = NutritionItem {
            food_name: "Rice".to_string(),
            mass_g: 0.0,
            volume_ml: None,
            total_calories: 0.0,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("volume_ml").is_none());
        assert_eq!(value["mass_g"], 0.0);
    }
}
