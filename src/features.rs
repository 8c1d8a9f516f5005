use crate::{
    error::{validation_error, AppError},
    symptoms::SymptomNormalizer,
    types::SymptomRatings,
};
use std::collections::HashMap;
use tracing::debug;

/// Numeric input aligned position-by-position with a feature schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// Output of [`FeatureBuilder::build`]: the vector plus the canonical keys
/// that matched nothing in the schema.
#[derive(Debug, Clone)]
pub struct BuiltFeatures {
    pub vector: FeatureVector,
    pub unmatched: Vec<String>,
}

pub struct FeatureBuilder<'a> {
    normalizer: &'a SymptomNormalizer,
    schema: &'a [String],
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(normalizer: &'a SymptomNormalizer, schema: &'a [String]) -> Self {
        Self { normalizer, schema }
    }

    pub fn build(&self, ratings: Option<&SymptomRatings>) -> Result<BuiltFeatures, AppError> {
        let ratings = match ratings {
            Some(r) if !r.is_empty() => r,
            _ => return Err(validation_error("No symptom ratings provided")),
        };

        // Keys collapsing onto the same feature keep the highest rating.
        let mut canonical: HashMap<String, f64> = HashMap::with_capacity(ratings.len());
        for (raw, &rating) in ratings {
            if !rating.is_finite() {
                return Err(AppError::InvalidInput(format!(
                    "Rating for '{}' is not a finite number",
                    raw
                )));
            }
            let key = self.normalizer.feature_normalize(raw);
            canonical
                .entry(key)
                .and_modify(|existing| *existing = existing.max(rating))
                .or_insert(rating);
        }

        let values: Vec<f64> = self
            .schema
            .iter()
            .map(|feature| canonical.get(feature).copied().unwrap_or(0.0))
            .collect();

        let mut unmatched: Vec<String> = canonical
            .into_keys()
            .filter(|key| !self.schema.contains(key))
            .collect();
        unmatched.sort();

        debug!(
            "Built feature vector: {} features, {} ratings, {} unmatched",
            values.len(),
            ratings.len(),
            unmatched.len()
        );

        Ok(BuiltFeatures {
            vector: FeatureVector::from(values),
            unmatched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<String> {
        ["fever", "headache", "joint_pain", "chest_pain", "cough", "nausea"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn ratings(pairs: &[(&str, f64)]) -> SymptomRatings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_ratings_land_on_schema_positions() {
        let normalizer = SymptomNormalizer::default();
        let schema = schema();
        let builder = FeatureBuilder::new(&normalizer, &schema);

        let input = ratings(&[("fever", 4.0), ("joint pain", 3.0), ("cough", 2.0)]);
        let built = builder.build(Some(&input)).unwrap();

        assert_eq!(built.vector.as_slice(), &[4.0, 0.0, 3.0, 0.0, 2.0, 0.0]);
        assert!(built.unmatched.is_empty());
    }

    #[test]
    fn test_hyphenated_alias_resolves() {
        let normalizer = SymptomNormalizer::default();
        let schema = schema();
        let builder = FeatureBuilder::new(&normalizer, &schema);

        let built = builder.build(Some(&ratings(&[("chest-pain", 5.0)]))).unwrap();
        assert_eq!(built.vector.as_slice()[3], 5.0);
        assert_eq!(built.vector.as_slice().iter().sum::<f64>(), 5.0);
    }

    #[test]
    fn test_unknown_symptoms_are_dropped() {
        let normalizer = SymptomNormalizer::default();
        let schema = schema();
        let builder = FeatureBuilder::new(&normalizer, &schema);

        let input = ratings(&[("Blurred Vision", 3.0), ("migraine", 2.0)]);
        let built = builder.build(Some(&input)).unwrap();

        assert_eq!(built.vector.len(), schema.len());
        assert_eq!(built.vector.as_slice(), &[0.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(built.unmatched, vec!["blurred_vision".to_string()]);
    }

    #[test]
    fn test_empty_or_missing_ratings_rejected() {
        let normalizer = SymptomNormalizer::default();
        let schema = schema();
        let builder = FeatureBuilder::new(&normalizer, &schema);

        assert!(matches!(
            builder.build(Some(&SymptomRatings::new())),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(builder.build(None), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_colliding_aliases_keep_highest_rating() {
        let normalizer = SymptomNormalizer::default();
        let schema = schema();
        let builder = FeatureBuilder::new(&normalizer, &schema);

        let input = ratings(&[("chest pain", 2.0), ("pain in chest", 5.0), ("Chest-Pain", 1.0)]);
        let built = builder.build(Some(&input)).unwrap();
        assert_eq!(built.vector.as_slice()[3], 5.0);
    }

    #[test]
    fn test_non_finite_rating_rejected() {
        let normalizer = SymptomNormalizer::default();
        let schema = schema();
        let builder = FeatureBuilder::new(&normalizer, &schema);

        let input = ratings(&[("fever", f64::NAN)]);
        assert!(matches!(builder.build(Some(&input)), Err(AppError::InvalidInput(_))));
    }
}
