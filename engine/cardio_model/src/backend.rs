//! Pluggable classifier trait and error types for model inference

use cardio_schema::FeatureVector;
use thiserror::Error;

use crate::label::{ClassLabel, ClassProbabilities};
use crate::metadata::ModelMetadata;

/// Errors that can occur during backend operations
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("input has {found} features but the model expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("model produced invalid output: {0}")]
    InvalidOutput(String),
    #[error("model loading failed: {0}")]
    Load(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A trained binary classifier.
///
/// Backends start unloaded and receive their serialized parameters once via
/// [`ModelBackend::load_model`]. After that every method takes `&self`, so a
/// loaded backend can be shared behind an `Arc` and called from many threads.
pub trait ModelBackend: Send + Sync {
    /// Load model parameters from bytes
    fn load_model(&mut self, model_bytes: &[u8], metadata: &ModelMetadata)
        -> Result<(), ModelError>;

    /// Predicted class for one feature vector.
    fn classify(&self, vector: &FeatureVector) -> Result<ClassLabel, ModelError>;

    /// Probability for each class; non-negative and summing to one.
    fn class_probabilities(&self, vector: &FeatureVector)
        -> Result<ClassProbabilities, ModelError>;

    /// Get backend name/identifier
    fn backend_name(&self) -> &str;

    fn is_loaded(&self) -> bool;

    /// Number of features the loaded model expects, `None` before loading.
    fn input_size(&self) -> Option<usize>;

    fn metadata(&self) -> Option<&ModelMetadata>;

    /// Optional: additive per-feature contributions to the decision score.
    fn contributions(&self, _vector: &FeatureVector) -> Result<Option<Vec<f64>>, ModelError> {
        Ok(None)
    }
}

/// Reject vectors whose length differs from the model's input size.
pub fn check_dimension(expected: usize, vector: &FeatureVector) -> Result<(), ModelError> {
    if vector.len() != expected {
        return Err(ModelError::DimensionMismatch {
            expected,
            found: vector.len(),
        });
    }
    Ok(())
}

/// Parameters must agree with a declared feature list, if the metadata has one.
pub(crate) fn check_declared_features(
    metadata: &ModelMetadata,
    n_features: usize,
) -> Result<(), ModelError> {
    if metadata.declares_features() && metadata.feature_names.len() != n_features {
        return Err(ModelError::Load(format!(
            "metadata declares {} features but parameters describe {}",
            metadata.feature_names.len(),
            n_features
        )));
    }
    Ok(())
}

pub(crate) fn not_loaded(backend: &str) -> ModelError {
    ModelError::Unavailable(format!("{backend} model not loaded"))
}
