use crate::{
    error::AppError,
    features::FeatureBuilder,
    model::{Classifier, NaiveBayesClassifier},
    questions::generate_questions,
    ranking::rank_top_k,
    symptoms::SymptomNormalizer,
    types::{DiseaseProbability, ModelInfoResponse, SymptomRatings},
};
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// The loaded model plus everything needed to serve predictions.
///
/// Built once at startup and shared read-only between requests.
pub struct TriageEngine {
    normalizer: SymptomNormalizer,
    classifier: Box<dyn Classifier>,
    model_info: ModelInfoResponse,
}

impl TriageEngine {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, AppError> {
        info!("Initializing triage engine...");

        let classifier = NaiveBayesClassifier::load_from_file(model_path)?;
        let model_info = ModelInfoResponse {
            version: classifier.version().to_string(),
            fingerprint: classifier.fingerprint().to_string(),
            num_features: classifier.feature_schema().len(),
            num_diseases: classifier.classes().len(),
        };

        let engine = Self::new(SymptomNormalizer::default(), Box::new(classifier), model_info);
        info!(
            "Triage engine initialized with {} symptom aliases",
            engine.normalizer.len()
        );
        Ok(engine)
    }

    pub fn new(
        normalizer: SymptomNormalizer,
        classifier: Box<dyn Classifier>,
        model_info: ModelInfoResponse,
    ) -> Self {
        Self {
            normalizer,
            classifier,
            model_info,
        }
    }

    /// Full pipeline: normalize, vectorize, infer, rank.
    pub fn predict(
        &self,
        ratings: Option<&SymptomRatings>,
    ) -> Result<Vec<DiseaseProbability>, AppError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("predict", %request_id);
        let _guard = span.enter();
        let start = Instant::now();

        let result = self.run_pipeline(ratings);

        let latency = start.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("prediction_duration_ms").record(latency);
        match &result {
            Ok(top) => {
                metrics::counter!("predictions_total").increment(1);
                info!("Prediction completed in {:.2}ms: {:?}", latency, top);
            }
            Err(e) => {
                metrics::counter!("prediction_errors_total").increment(1);
                warn!("Prediction failed: {}", e);
            }
        }
        result
    }

    fn run_pipeline(
        &self,
        ratings: Option<&SymptomRatings>,
    ) -> Result<Vec<DiseaseProbability>, AppError> {
        let builder = FeatureBuilder::new(&self.normalizer, self.classifier.feature_schema());
        let built = builder.build(ratings)?;
        if !built.unmatched.is_empty() {
            warn!("Ignoring symptoms unknown to the model: {:?}", built.unmatched);
        }

        let distribution = self.classifier.infer(&built.vector)?;
        debug!("Class distribution: {:?}", distribution.entries);

        rank_top_k(&distribution)
    }

    /// Follow-up questions for each symptom, keyed by its display form.
    pub fn questions<'a, R>(
        &self,
        symptoms: impl IntoIterator<Item = &'a str>,
        rng: &mut R,
    ) -> BTreeMap<String, Vec<String>>
    where
        R: Rng + ?Sized,
    {
        metrics::counter!("questions_total").increment(1);
        generate_questions(symptoms, rng)
    }

    pub fn model_info(&self) -> &ModelInfoResponse {
        &self.model_info
    }

    pub fn normalizer(&self) -> &SymptomNormalizer {
        &self.normalizer
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::tests::fabricated_bundle;

    pub(crate) fn test_engine() -> TriageEngine {
        let classifier = NaiveBayesClassifier::from_bundle(fabricated_bundle()).unwrap();
        let model_info = ModelInfoResponse {
            version: classifier.version().to_string(),
            fingerprint: String::new(),
            num_features: classifier.feature_schema().len(),
            num_diseases: classifier.classes().len(),
        };
        TriageEngine::new(SymptomNormalizer::default(), Box::new(classifier), model_info)
    }

    fn ratings(pairs: &[(&str, f64)]) -> SymptomRatings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_predict_returns_three_renormalized_diseases() {
        let engine = test_engine();
        let input = ratings(&[("fever", 4.0), ("joint pain", 3.0), ("cough", 2.0)]);

        let result = engine.predict(Some(&input)).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].disease, "dengue");

        let sum: f64 = result.iter().map(|r| r.probability).sum();
        assert!((sum - 1.0).abs() <= 0.001 + 1e-9);
        assert!(result.windows(2).all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_alias_reaches_the_model() {
        let engine = test_engine();
        let result = engine.predict(Some(&ratings(&[("Chest-Pain", 5.0)]))).unwrap();
        assert_eq!(result[0].disease, "angina");
    }

    #[test]
    fn test_empty_ratings_rejected() {
        let engine = test_engine();
        assert!(matches!(
            engine.predict(Some(&SymptomRatings::new())),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(engine.predict(None), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_only_unknown_symptoms_still_predicts_from_prior() {
        let engine = test_engine();
        let result = engine
            .predict(Some(&ratings(&[("blurred vision", 4.0)])))
            .unwrap();

        // uniform prior: ties resolve in class order
        let labels: Vec<&str> = result.iter().map(|r| r.disease.as_str()).collect();
        assert_eq!(labels, vec!["influenza", "dengue", "angina"]);
        assert!(result.iter().all(|r| r.probability == 0.333));
    }

    #[test]
    fn test_demo_model_artifact() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/disease_model.json");
        let engine = TriageEngine::load(path).unwrap();
        assert_eq!(engine.model_info().num_diseases, 8);
        assert_eq!(engine.model_info().fingerprint.len(), 64);

        let input = ratings(&[("fever", 4.0), ("joint pain", 3.0), ("cough", 2.0)]);
        let result = engine.predict(Some(&input)).unwrap();
        let sum: f64 = result.iter().map(|r| r.probability).sum();
        assert_eq!(result.len(), 3);
        assert!((sum - 1.0).abs() <= 0.001 + 1e-9);

        let result = engine.predict(Some(&ratings(&[("chest-pain", 5.0)]))).unwrap();
        assert_eq!(result[0].disease, "angina");
    }

    #[test]
    fn test_prediction_is_reproducible() {
        let engine = test_engine();
        let input = ratings(&[("headache", 2.0), ("temperature", 2.0)]);
        let first = engine.predict(Some(&input)).unwrap();
        for _ in 0..10 {
            assert_eq!(engine.predict(Some(&input)).unwrap(), first);
        }
    }
}
