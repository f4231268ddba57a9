//! Backend payload fixtures covering the result shapes seen in production

#![allow(dead_code)]

use serde_json::{json, Value};

/// Detailed item entries as the worker writes them
pub fn meal_items() -> Value {
    json!([
        {"food_name": "Steamed rice", "mass_g": 150.0, "volume_ml": 180.0, "total_calories": 195.0},
        {"food_name": "Grilled chicken", "mass_g": 120.0, "volume_ml": 110.0, "total_calories": 198.0},
        {"name": "Broccoli", "mass_g": 80.0, "calories": 27.0}
    ])
}

pub const MEAL_CALORIES: f64 = 420.0;
pub const MEAL_MASS_G: f64 = 350.0;
pub const MEAL_VOLUME_ML: f64 = 290.0;

/// Detail document shapes, one per known item location
pub fn detail_shapes() -> Vec<(&'static str, Value)> {
    vec![
        ("detected_items", json!({"detected_items": meal_items()})),
        ("items", json!({"items": meal_items()})),
        (
            "full_results.nutrition.items",
            json!({"full_results": {"nutrition": {"items": meal_items()}}}),
        ),
        (
            "nutrition.items",
            json!({"nutrition": {"items": meal_items()}}),
        ),
    ]
}

/// Detail document with an explicit summary that disagrees with the items
pub fn detail_with_summary() -> Value {
    json!({
        "nutrition": {
            "items": meal_items(),
            "summary": {
                "total_food_volume_ml": 300.0,
                "total_mass_g": 355.0,
                "total_calories_kcal": 431.5,
                "num_food_items": 3
            }
        },
        "tracking": {"objects": 3}
    })
}

/// Simplified shape from the results endpoint
pub fn detected_foods() -> Value {
    json!([
        {"name": "Pepperoni pizza", "calories": 285},
        {"name": "Caesar salad", "calories": 180}
    ])
}

/// `GET /api/results/{id}` payload
pub fn results_payload(job_id: &str, download_url: Option<&str>) -> Value {
    let mut payload = json!({
        "job_id": job_id,
        "status": "completed",
        "created_at": "2025-03-01T12:00:00Z",
        "completed_at": "2025-03-01T12:01:30Z",
        "filename": "lunch.mp4",
        "detected_foods": detected_foods(),
        "segmented_images": {
            "overlay_urls": [{"frame": "frame_0001", "url": "https://bucket/overlay/1.png", "key": "overlay/1.png"}],
            "mask_urls": []
        }
    });
    if let Some(url) = download_url {
        payload["download_url"] = json!(url);
    }
    payload
}
