use crate::{error::AppError, features::FeatureVector};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Fewest disease classes a model may carry and still fill a top-3 result.
pub const MIN_CLASSES: usize = 3;

/// Persisted artifact produced by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub version: String,
    pub features: Vec<String>,
    pub diseases: Vec<String>,
    pub class_log_prior: Vec<f64>,
    /// One row per disease, one column per feature.
    pub feature_log_prob: Vec<Vec<f64>>,
}

/// Probability per trained class, in the classifier's class order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    pub entries: Vec<(String, f64)>,
}

impl ClassDistribution {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Anything that turns a schema-aligned vector into a full class distribution.
pub trait Classifier: Send + Sync {
    fn feature_schema(&self) -> &[String];

    fn classes(&self) -> &[String];

    fn infer(&self, vector: &FeatureVector) -> Result<ClassDistribution, AppError>;
}

/// Multinomial Naive Bayes over symptom severities.
#[derive(Debug)]
pub struct NaiveBayesClassifier {
    version: String,
    fingerprint: String,
    features: Vec<String>,
    diseases: Vec<String>,
    class_log_prior: DVector<f64>,
    feature_log_prob: DMatrix<f64>,
}

impl NaiveBayesClassifier {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let bundle: ModelBundle = serde_json::from_slice(&bytes)?;
        let fingerprint = hex::encode(Sha256::digest(&bytes));

        let classifier = Self::from_bundle(bundle)?.with_fingerprint(fingerprint);
        info!(
            "Loaded model {} from {} ({} features, {} diseases, sha256 {})",
            classifier.version,
            path.display(),
            classifier.features.len(),
            classifier.diseases.len(),
            classifier.short_fingerprint()
        );
        Ok(classifier)
    }

    pub fn from_bundle(bundle: ModelBundle) -> Result<Self, AppError> {
        Self::validate(&bundle)?;

        let n_classes = bundle.diseases.len();
        let n_features = bundle.features.len();
        let flat: Vec<f64> = bundle.feature_log_prob.into_iter().flatten().collect();

        Ok(Self {
            version: bundle.version,
            fingerprint: String::new(),
            features: bundle.features,
            diseases: bundle.diseases,
            class_log_prior: DVector::from_vec(bundle.class_log_prior),
            feature_log_prob: DMatrix::from_row_slice(n_classes, n_features, &flat),
        })
    }

    fn with_fingerprint(mut self, fingerprint: String) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    fn validate(bundle: &ModelBundle) -> Result<(), AppError> {
        if bundle.features.is_empty() {
            return Err(AppError::ModelLoad("feature list is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(bundle.features.len());
        if let Some(dup) = bundle.features.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(AppError::ModelLoad(format!("duplicate feature '{}'", dup)));
        }

        if bundle.diseases.len() < MIN_CLASSES {
            return Err(AppError::InsufficientClasses {
                found: bundle.diseases.len(),
                required: MIN_CLASSES,
            });
        }

        if bundle.class_log_prior.len() != bundle.diseases.len() {
            return Err(AppError::ModelLoad(format!(
                "{} class priors for {} diseases",
                bundle.class_log_prior.len(),
                bundle.diseases.len()
            )));
        }

        if bundle.feature_log_prob.len() != bundle.diseases.len() {
            return Err(AppError::ModelLoad(format!(
                "{} likelihood rows for {} diseases",
                bundle.feature_log_prob.len(),
                bundle.diseases.len()
            )));
        }

        for (disease, row) in bundle.diseases.iter().zip(&bundle.feature_log_prob) {
            if row.len() != bundle.features.len() {
                return Err(AppError::ModelLoad(format!(
                    "likelihood row for '{}' has {} entries, expected {}",
                    disease,
                    row.len(),
                    bundle.features.len()
                )));
            }
        }

        let all_finite = bundle.class_log_prior.iter().all(|v| v.is_finite())
            && bundle
                .feature_log_prob
                .iter()
                .flatten()
                .all(|v| v.is_finite());
        if !all_finite {
            return Err(AppError::ModelLoad(
                "model parameters contain non-finite values".to_string(),
            ));
        }

        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn short_fingerprint(&self) -> &str {
        &self.fingerprint[..self.fingerprint.len().min(12)]
    }
}

impl Classifier for NaiveBayesClassifier {
    fn feature_schema(&self) -> &[String] {
        &self.features
    }

    fn classes(&self) -> &[String] {
        &self.diseases
    }

    fn infer(&self, vector: &FeatureVector) -> Result<ClassDistribution, AppError> {
        if vector.len() != self.features.len() {
            return Err(AppError::DimensionMismatch {
                expected: self.features.len(),
                actual: vector.len(),
            });
        }

        let x = DVector::from_column_slice(vector.as_slice());
        let joint_log_likelihood = &self.feature_log_prob * x + &self.class_log_prior;

        // Log-sum-exp keeps large severities from underflowing every class to zero.
        let max = joint_log_likelihood.max();
        let exp = joint_log_likelihood.map(|v| (v - max).exp());
        let total = exp.sum();

        let entries = self
            .diseases
            .iter()
            .zip(exp.iter())
            .map(|(disease, e)| (disease.clone(), e / total))
            .collect();

        debug!("Inferred distribution over {} classes", self.diseases.len());
        Ok(ClassDistribution { entries })
    }
}
