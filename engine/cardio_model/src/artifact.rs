//! On-disk model artifacts: a JSON envelope of metadata plus backend parameters.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::backend::{ModelBackend, ModelError};
use crate::backends::{ForestBackend, ForestParameters, LogisticBackend, LogisticParameters};
use crate::metadata::{ModelMetadata, ModelType};

/// Serialized model as written by the training side.
///
/// ```json
/// {
///   "metadata": { "id": "heart-lr", "name": "...", "version": "1.0.0", "model_type": "logistic" },
///   "parameters": { "coefficients": [...], "intercept": -0.3 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    pub parameters: JsonValue,
}

impl ModelArtifact {
    pub fn logistic(
        metadata: ModelMetadata,
        params: &LogisticParameters,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            metadata,
            parameters: serde_json::to_value(params)?,
        })
    }

    pub fn forest(metadata: ModelMetadata, params: &ForestParameters) -> Result<Self, ModelError> {
        Ok(Self {
            metadata,
            parameters: serde_json::to_value(params)?,
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let s = fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

fn load_into<B>(mut backend: B, artifact: &ModelArtifact) -> Result<Arc<dyn ModelBackend>, ModelError>
where
    B: ModelBackend + 'static,
{
    let bytes = serde_json::to_vec(&artifact.parameters)?;
    backend.load_model(&bytes, &artifact.metadata)?;
    Ok(Arc::new(backend))
}

/// Pick the backend named by the metadata and load the parameters into it.
pub fn instantiate(artifact: &ModelArtifact) -> Result<Arc<dyn ModelBackend>, ModelError> {
    match &artifact.metadata.model_type {
        ModelType::Logistic => load_into(LogisticBackend::new(), artifact),
        ModelType::TreeEnsemble => load_into(ForestBackend::new(), artifact),
        ModelType::Custom(name) => Err(ModelError::Unavailable(format!(
            "no backend available for custom model type `{name}`"
        ))),
    }
}

/// Read an artifact file and return a loaded, shareable model.
pub fn load_artifact(path: impl AsRef<Path>) -> Result<Arc<dyn ModelBackend>, ModelError> {
    let path = path.as_ref();
    let artifact = ModelArtifact::read(path)?;
    let model = instantiate(&artifact)?;
    log::info!(
        "loaded model `{}` v{} ({}) from {}",
        artifact.metadata.id,
        artifact.metadata.version,
        model.backend_name(),
        path.display()
    );
    Ok(model)
}
