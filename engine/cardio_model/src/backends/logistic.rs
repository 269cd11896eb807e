//! Logistic regression backend: `P(disease) = σ(w·z + b)` over optionally
//! standardized inputs `z = (x - mean) / scale`.

use cardio_schema::FeatureVector;
use serde::{Deserialize, Serialize};

use crate::backend::{check_declared_features, check_dimension, not_loaded, ModelBackend, ModelError};
use crate::label::{ClassLabel, ClassProbabilities};
use crate::metadata::ModelMetadata;

fn default_threshold() -> f64 {
    0.5
}

/// Per-feature standardization fitted at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParameters {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
    /// Probability of class 1 at or above which the model predicts class 1.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticParameters {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            scaler: None,
            threshold: default_threshold(),
        }
    }

    pub fn with_scaler(mut self, mean: Vec<f64>, scale: Vec<f64>) -> Self {
        self.scaler = Some(StandardScaler { mean, scale });
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn check(&self) -> Result<(), ModelError> {
        let n = self.coefficients.len();
        if n == 0 {
            return Err(ModelError::Load("logistic model has no coefficients".into()));
        }
        if !self.coefficients.iter().all(|w| w.is_finite()) || !self.intercept.is_finite() {
            return Err(ModelError::Load("logistic parameters must be finite".into()));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ModelError::Load(format!(
                "decision threshold {} must lie strictly between 0 and 1",
                self.threshold
            )));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(ModelError::Load(format!(
                    "scaler has {} means and {} scales for {} coefficients",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    n
                )));
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return Err(ModelError::Load("scaler scales must be finite and non-zero".into()));
            }
        }
        Ok(())
    }
}

/// Numerically stable logistic function.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogisticBackend {
    params: Option<LogisticParameters>,
    metadata: Option<ModelMetadata>,
}

impl LogisticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an already-loaded backend from in-memory parameters.
    pub fn from_parameters(
        params: LogisticParameters,
        metadata: ModelMetadata,
    ) -> Result<Self, ModelError> {
        let bytes = serde_json::to_vec(&params)?;
        let mut backend = Self::new();
        backend.load_model(&bytes, &metadata)?;
        Ok(backend)
    }

    fn loaded(&self) -> Result<&LogisticParameters, ModelError> {
        self.params.as_ref().ok_or_else(|| not_loaded("logistic"))
    }

    fn standardized(params: &LogisticParameters, vector: &FeatureVector) -> Vec<f64> {
        match &params.scaler {
            Some(scaler) => vector
                .iter()
                .zip(scaler.mean.iter().zip(&scaler.scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            None => vector.iter().collect(),
        }
    }

    fn positive_probability(&self, vector: &FeatureVector) -> Result<f64, ModelError> {
        let params = self.loaded()?;
        check_dimension(params.coefficients.len(), vector)?;
        let logit = Self::standardized(params, vector)
            .iter()
            .zip(&params.coefficients)
            .map(|(z, w)| z * w)
            .sum::<f64>()
            + params.intercept;
        Ok(sigmoid(logit))
    }
}

impl ModelBackend for LogisticBackend {
    fn load_model(
        &mut self,
        model_bytes: &[u8],
        metadata: &ModelMetadata,
    ) -> Result<(), ModelError> {
        let params: LogisticParameters = serde_json::from_slice(model_bytes)?;
        params.check()?;
        check_declared_features(metadata, params.coefficients.len())?;
        log::debug!(
            "loaded logistic model `{}` v{} with {} coefficients",
            metadata.id,
            metadata.version,
            params.coefficients.len()
        );
        self.params = Some(params);
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn classify(&self, vector: &FeatureVector) -> Result<ClassLabel, ModelError> {
        let threshold = self.loaded()?.threshold;
        let p = self.positive_probability(vector)?;
        Ok(if p >= threshold {
            ClassLabel::DISEASE
        } else {
            ClassLabel::NO_DISEASE
        })
    }

    fn class_probabilities(
        &self,
        vector: &FeatureVector,
    ) -> Result<ClassProbabilities, ModelError> {
        let p = self.positive_probability(vector)?;
        Ok(ClassProbabilities::binary(1.0 - p, p))
    }

    fn backend_name(&self) -> &str {
        "logistic"
    }

    fn is_loaded(&self) -> bool {
        self.params.is_some()
    }

    fn input_size(&self) -> Option<usize> {
        self.params.as_ref().map(|p| p.coefficients.len())
    }

    fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    fn contributions(&self, vector: &FeatureVector) -> Result<Option<Vec<f64>>, ModelError> {
        let params = self.loaded()?;
        check_dimension(params.coefficients.len(), vector)?;
        let contributions = Self::standardized(params, vector)
            .iter()
            .zip(&params.coefficients)
            .map(|(z, w)| z * w)
            .collect();
        Ok(Some(contributions))
    }
}
