use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Raw symptom text mapped to a self-reported severity (nominally 1-5).
pub type SymptomRatings = HashMap<String, f64>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub symptom_ratings: Option<SymptomRatings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProbability {
    pub disease: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub top_3_diseases: Vec<DiseaseProbability>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionsQuery {
    #[serde(default)]
    pub symptom: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionsRequest {
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub questions: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub version: String,
    pub fingerprint: String,
    pub num_features: usize,
    pub num_diseases: usize,
}
