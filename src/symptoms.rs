//! Symptom text normalization.
//!
//! Two distinct operations live here:
//! - [`display_normalize`] cleans text for showing it back to the user and
//!   keying follow-up questions. It knows nothing about the model.
//! - [`SymptomNormalizer::feature_normalize`] resolves phrase variants through
//!   the synonym table to the canonical keys the classifier was trained on.
//!
//! Only the second one may feed the feature vector.

use std::collections::HashMap;

/// Alias phrase (already lowercased, hyphen-free, trimmed) to canonical key.
const SYNONYMS: &[(&str, &str)] = &[
    ("chest pain", "chest_pain"),
    ("pain in chest", "chest_pain"),
    ("chest ache", "chest_pain"),
    ("shortness of breath", "shortness_of_breath"),
    ("breathing difficulty", "shortness_of_breath"),
    ("difficulty breathing", "shortness_of_breath"),
    ("breathlessness", "shortness_of_breath"),
    ("fever", "fever"),
    ("high temperature", "fever"),
    ("temperature", "fever"),
    ("headache", "headache"),
    ("migraine", "headache"),
    ("head pain", "headache"),
    ("stomach ache", "abdominal_pain"),
    ("stomachache", "abdominal_pain"),
    ("tummy pain", "abdominal_pain"),
    ("abdominal pain", "abdominal_pain"),
    ("belly pain", "abdominal_pain"),
    ("cough", "cough"),
    ("dry cough", "cough"),
    ("wet cough", "cough"),
    ("sore throat", "sore_throat"),
    ("throat pain", "sore_throat"),
    ("runny nose", "runny_nose"),
    ("running nose", "runny_nose"),
    ("body aches", "body_aches"),
    ("body ache", "body_aches"),
    ("joint pain", "joint_pain"),
    ("joint ache", "joint_pain"),
    ("aching joints", "joint_pain"),
    ("muscle pain", "muscle_pain"),
    ("muscle ache", "muscle_pain"),
    ("back pain", "back_pain"),
    ("backache", "back_pain"),
    ("nausea", "nausea"),
    ("feeling sick", "nausea"),
    ("vomiting", "vomiting"),
    ("throwing up", "vomiting"),
    ("diarrhea", "diarrhea"),
    ("diarrhoea", "diarrhea"),
    ("loose stools", "diarrhea"),
    ("dizziness", "dizziness"),
    ("lightheadedness", "dizziness"),
    ("feeling dizzy", "dizziness"),
    ("fatigue", "fatigue"),
    ("tiredness", "fatigue"),
    ("exhaustion", "fatigue"),
    ("rash", "skin_rash"),
    ("skin rash", "skin_rash"),
    ("itching", "itching"),
    ("itchy skin", "itching"),
];

/// Lowercase, turn hyphens into spaces, trim.
///
/// This is the lossy cosmetic form used for question keys. Do not use it to
/// build feature vectors.
pub fn display_normalize(text: &str) -> String {
    text.to_lowercase().replace('-', " ").trim().to_string()
}

/// Synonym-aware normalizer producing canonical feature keys.
///
/// The table is built once and shared read-only.
#[derive(Debug, Clone)]
pub struct SymptomNormalizer {
    synonyms: HashMap<String, String>,
}

impl Default for SymptomNormalizer {
    fn default() -> Self {
        Self::with_synonyms(SYNONYMS.iter().copied())
    }
}

impl SymptomNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a normalizer from custom `(alias, canonical)` pairs. Aliases are
    /// cleaned the same way incoming text is, so `"Chest-Pain"` works as a key.
    pub fn with_synonyms<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let synonyms = pairs
            .into_iter()
            .map(|(alias, canonical)| (display_normalize(alias), canonical.to_string()))
            .collect();
        Self { synonyms }
    }

    /// Canonical key for arbitrary user text. Never fails; unknown symptoms
    /// pass through with spaces turned into underscores.
    pub fn feature_normalize(&self, text: &str) -> String {
        let cleaned = display_normalize(text);
        match self.synonyms.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned.replace(' ', "_"),
        }
    }

    pub fn canonical_keys(&self) -> impl Iterator<Item = &str> {
        self.synonyms.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}
