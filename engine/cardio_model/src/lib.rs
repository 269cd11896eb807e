//! Classifier adapters for cardiac risk inference.
//!
//! [`ModelBackend`] is the capability boundary around a trained binary
//! classifier. Backends are loaded once from a [`ModelArtifact`] and then
//! shared read-only across requests.

pub mod artifact;
pub mod backend;
pub mod backends;
pub mod label;
pub mod metadata;

pub use artifact::{instantiate, load_artifact, ModelArtifact};
pub use backend::{check_dimension, ModelBackend, ModelError};
pub use backends::{ForestBackend, ForestParameters, LogisticBackend, LogisticParameters};
pub use label::{ClassLabel, ClassProbabilities};
pub use metadata::{ModelMetadata, ModelType, ModelVersion};
