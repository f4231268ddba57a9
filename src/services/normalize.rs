//! Canonical extraction of nutrition data from loosely structured payloads.
//!
//! The backend has shipped several result shapes over time. Each search below is
//! an ordered list of locator functions; the first locator that matches wins.
//! Everything here is pure and never fails: missing or malformed data maps to
//! defaults, never to `null` or NaN.

use serde_json::{Map, Value};

use crate::models::nutrition::{NutritionItem, NutritionSummary};

const UNKNOWN_FOOD: &str = "Unknown";

pub type ItemsLocator = fn(&Value) -> Option<&Vec<Value>>;
pub type SummaryLocator = fn(&Value) -> Option<&Map<String, Value>>;

/// Item list locations in a detail document, in priority order.
pub const ITEM_LOCATIONS: [(&str, ItemsLocator); 4] = [
    ("detected_items", detected_items),
    ("items", top_level_items),
    ("full_results.nutrition.items", full_results_items),
    ("nutrition.items", nutrition_items),
];

/// Summary locations in a detail document, in priority order.
pub const SUMMARY_LOCATIONS: [(&str, SummaryLocator); 3] = [
    ("full_results.nutrition.summary", full_results_summary),
    ("nutrition.summary", nutrition_summary),
    ("meal_summary", meal_summary),
];

fn detected_items(doc: &Value) -> Option<&Vec<Value>> {
    non_empty_array(doc.get("detected_items"))
}

fn top_level_items(doc: &Value) -> Option<&Vec<Value>> {
    non_empty_array(doc.get("items"))
}

fn full_results_items(doc: &Value) -> Option<&Vec<Value>> {
    non_empty_array(doc.pointer("/full_results/nutrition/items"))
}

fn nutrition_items(doc: &Value) -> Option<&Vec<Value>> {
    non_empty_array(doc.pointer("/nutrition/items"))
}

// The two nested summaries win whenever present, even when empty.
fn full_results_summary(doc: &Value) -> Option<&Map<String, Value>> {
    doc.pointer("/full_results/nutrition/summary")?.as_object()
}

fn nutrition_summary(doc: &Value) -> Option<&Map<String, Value>> {
    doc.pointer("/nutrition/summary")?.as_object()
}

fn meal_summary(doc: &Value) -> Option<&Map<String, Value>> {
    non_empty_object(doc.get("meal_summary"))
}

fn non_empty_array(value: Option<&Value>) -> Option<&Vec<Value>> {
    value?.as_array().filter(|items| !items.is_empty())
}

fn non_empty_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value?.as_object().filter(|map| !map.is_empty())
}

/// First non-empty item list in a detail document, with its location label.
pub fn find_items(doc: &Value) -> Option<(&'static str, &[Value])> {
    ITEM_LOCATIONS
        .iter()
        .find_map(|(label, locate)| locate(doc).map(|items| (*label, items.as_slice())))
}

/// First located summary object in a detail document, with its location label.
/// Only `meal_summary` has to be non-empty to be chosen.
pub fn find_summary(doc: &Value) -> Option<(&'static str, &Map<String, Value>)> {
    SUMMARY_LOCATIONS
        .iter()
        .find_map(|(label, locate)| locate(doc).map(|summary| (*label, summary)))
}

/// Items and summary pulled out of one document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extraction {
    pub items: Option<Vec<NutritionItem>>,
    pub summary: Option<NutritionSummary>,
}

/// Extract canonical items and summary from a fetched detail document.
///
/// The summary comes from the first located summary object. When none is found,
/// or the chosen one is empty, it is computed from the raw items, when there are any.
pub fn extract_detail(doc: &Value) -> Extraction {
    let raw_items = match find_items(doc) {
        Some((location, items)) => {
            tracing::debug!(location, count = items.len(), "Found items in detail document");
            Some(items)
        }
        None => {
            tracing::warn!("No items array found in detail document");
            None
        }
    };

    let found_count = raw_items.map_or(0, |items| items.len());
    let summary = match find_summary(doc) {
        Some((location, summary)) if !summary.is_empty() => {
            tracing::debug!(location, "Found nutrition summary in detail document");
            Some(summary_from_object(summary, found_count))
        }
        Some((location, _)) => {
            tracing::debug!(location, "Summary object is empty, computing from items");
            raw_items.map(summary_from_items)
        }
        None => raw_items.map(summary_from_items),
    };

    Extraction {
        items: raw_items.map(|items| items.iter().map(normalize_item).collect()),
        summary,
    }
}

/// Map one item from any of the detailed shapes.
pub fn normalize_item(item: &Value) -> NutritionItem {
    NutritionItem {
        food_name: text(item.get("food_name"))
            .or_else(|| text(item.get("name")))
            .unwrap_or(UNKNOWN_FOOD)
            .to_string(),
        mass_g: nonzero(item.get("mass_g")).unwrap_or(0.0),
        volume_ml: finite(item.get("volume_ml")),
        total_calories: item_calories(item),
    }
}

/// Map one entry of the simplified `detected_foods` shape. Mass and volume are
/// not part of that shape and are never guessed.
pub fn normalize_detected_food(food: &Value) -> NutritionItem {
    NutritionItem {
        food_name: text(food.get("name")).unwrap_or(UNKNOWN_FOOD).to_string(),
        mass_g: 0.0,
        volume_ml: None,
        total_calories: nonzero(food.get("calories")).unwrap_or(0.0),
    }
}

/// `detected_foods` on a results payload, if it is an array (possibly empty).
pub fn detected_foods(payload: &Value) -> Option<Vec<NutritionItem>> {
    payload
        .get("detected_foods")?
        .as_array()
        .map(|foods| foods.iter().map(normalize_detected_food).collect())
}

/// Canonical summary from a summary object; `num_food_items` falls back to the
/// number of items found alongside it.
pub fn summary_from_object(summary: &Map<String, Value>, found_items: usize) -> NutritionSummary {
    NutritionSummary {
        total_food_volume_ml: nonzero(summary.get("total_food_volume_ml")).unwrap_or(0.0),
        total_mass_g: nonzero(summary.get("total_mass_g")).unwrap_or(0.0),
        total_calories_kcal: nonzero(summary.get("total_calories_kcal")).unwrap_or(0.0),
        num_food_items: nonzero(summary.get("num_food_items"))
            .map(to_count)
            .unwrap_or_else(|| count(found_items)),
    }
}

/// Summary computed by summing over raw items.
pub fn summary_from_items(items: &[Value]) -> NutritionSummary {
    NutritionSummary {
        total_food_volume_ml: items
            .iter()
            .map(|item| nonzero(item.get("volume_ml")).unwrap_or(0.0))
            .sum(),
        total_mass_g: items
            .iter()
            .map(|item| nonzero(item.get("mass_g")).unwrap_or(0.0))
            .sum(),
        total_calories_kcal: items.iter().map(item_calories).sum(),
        num_food_items: count(items.len()),
    }
}

fn item_calories(item: &Value) -> f64 {
    nonzero(item.get("total_calories"))
        .or_else(|| nonzero(item.get("calories")))
        .unwrap_or(0.0)
}

fn text(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.is_empty())
}

/// Finite number, accepting numeric strings.
fn finite(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Finite, non-zero number. Zero counts as missing so a later alternative or
/// the default applies.
fn nonzero(value: Option<&Value>) -> Option<f64> {
    finite(value).filter(|n| *n != 0.0)
}

fn to_count(n: f64) -> u32 {
    n.round().clamp(0.0, u32::MAX as f64) as u32
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
