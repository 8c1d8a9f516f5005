//! Symptom triage engine: turns self-reported symptom severities into the
//! three most probable diseases using a pre-trained Naive Bayes model.

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod questions;
pub mod ranking;
pub mod routes;
pub mod symptoms;
pub mod types;

pub use engine::TriageEngine;
pub use error::AppError;
