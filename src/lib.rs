//! Nutrition Analysis Client
//!
//! This library drives the nutrition analysis backend's asynchronous job
//! workflow: it negotiates a presigned upload, uploads a meal video or image,
//! confirms the job, polls until it finishes, and normalizes the several
//! historical result shapes into one canonical result document.

pub mod config;
pub mod models;
pub mod services;

pub use services::{
    AnalysisError, AnalysisOutcome, NutritionApiClient, PollSettings, ProgressObserver,
};
