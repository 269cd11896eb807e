//! The per-request inference pipeline.
//!
//! A request moves through
//! `Received → Validated → VectorBuilt → Classified → Interpreted` and stops
//! at the first failure. There is no retry and no fallback verdict.

use std::fmt;
use std::sync::Arc;

use cardio_model::{ModelBackend, ModelError};
use cardio_schema::{
    build, field_order, validate_with, ClinicalRecord, RawFields, ValidationError,
    ValidationOptions, FEATURE_COUNT,
};
use serde::Serialize;
use thiserror::Error;

use crate::interpret::{interpret, InterpretError};
use crate::verdict::Verdict;

/// Allowed deviation of the class probabilities' sum from one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stage {
    Received,
    Validated,
    VectorBuilt,
    Classified,
    Interpreted,
    Presented,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::VectorBuilt => "vector built",
            Stage::Classified => "classified",
            Stage::Interpreted => "interpreted",
            Stage::Presented => "presented",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Interpret(#[from] InterpretError),
    #[error("model does not match the feature schema: {0}")]
    SchemaMismatch(String),
}

impl PipelineError {
    /// Last stage the request completed before failing.
    pub fn reached(&self) -> Stage {
        match self {
            PipelineError::Validation(_) | PipelineError::SchemaMismatch(_) => Stage::Received,
            PipelineError::Model(_) => Stage::VectorBuilt,
            PipelineError::Interpret(_) => Stage::Classified,
        }
    }
}

/// Check that a model can serve vectors built from the schema.
///
/// The model must be loaded and take exactly [`FEATURE_COUNT`] inputs. When
/// its metadata names its features, the names must equal
/// [`field_order`] position for position: a reordering would be accepted by
/// the model and silently corrupt every prediction.
pub fn verify_model(model: &dyn ModelBackend) -> Result<(), PipelineError> {
    if !model.is_loaded() {
        return Err(ModelError::Unavailable(format!(
            "{} backend has no model loaded",
            model.backend_name()
        ))
        .into());
    }
    match model.input_size() {
        Some(FEATURE_COUNT) => {}
        Some(n) => {
            return Err(PipelineError::SchemaMismatch(format!(
                "model expects {n} features, schema defines {FEATURE_COUNT}"
            )))
        }
        None => {
            return Err(PipelineError::SchemaMismatch(
                "model does not report its input size".into(),
            ))
        }
    }
    if let Some(meta) = model.metadata().filter(|m| m.declares_features()) {
        let expected = field_order();
        if meta.feature_names.len() != expected.len() {
            return Err(PipelineError::SchemaMismatch(format!(
                "model declares {} feature names, schema defines {}",
                meta.feature_names.len(),
                expected.len()
            )));
        }
        if let Some((i, (got, want))) = meta
            .feature_names
            .iter()
            .zip(expected.iter())
            .enumerate()
            .find(|(_, (got, want))| got.as_str() != **want)
        {
            return Err(PipelineError::SchemaMismatch(format!(
                "feature {i} is `{got}` in the model but `{want}` in the schema"
            )));
        }
    }
    Ok(())
}

/// Stateless inference over an injected, shared model.
#[derive(Clone)]
pub struct Pipeline {
    model: Arc<dyn ModelBackend>,
    options: ValidationOptions,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("model", &self.model.backend_name())
            .field("options", &self.options)
            .finish()
    }
}

impl Pipeline {
    /// Wrap a loaded model after checking it against the schema.
    pub fn new(model: Arc<dyn ModelBackend>) -> Result<Self, PipelineError> {
        verify_model(model.as_ref())?;
        if let Some(meta) = model.metadata() {
            log::info!(
                "pipeline ready with model `{}` v{} ({})",
                meta.id,
                meta.version,
                model.backend_name()
            );
        }
        Ok(Self {
            model,
            options: ValidationOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &dyn ModelBackend {
        self.model.as_ref()
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Run one request from raw input to verdict.
    pub fn run(&self, raw: &RawFields) -> Result<Verdict, PipelineError> {
        log::trace!("request {}", Stage::Received);
        let record = validate_with(raw, self.options).map_err(|e| {
            log::warn!("request rejected at validation: {e}");
            PipelineError::from(e)
        })?;
        log::trace!("request {}", Stage::Validated);
        self.run_record(record)
    }

    /// Run an already validated record through the model.
    pub fn run_record(&self, record: ClinicalRecord) -> Result<Verdict, PipelineError> {
        let vector = build(&record);
        log::trace!("request {}: {:?}", Stage::VectorBuilt, vector.as_slice());

        let classified = self.model.classify(&vector).and_then(|label| {
            let probabilities = self.model.class_probabilities(&vector)?;
            if !probabilities.is_normalized(PROBABILITY_TOLERANCE) {
                return Err(ModelError::InvalidOutput(format!(
                    "class probabilities sum to {}",
                    probabilities.total()
                )));
            }
            Ok((label, probabilities))
        });
        let (label, probabilities) = classified.map_err(|e| {
            log::warn!("request failed at classification: {e}");
            PipelineError::from(e)
        })?;
        log::trace!("request {}: label {label}", Stage::Classified);

        let verdict = interpret(label, &probabilities, record).map_err(|e| {
            log::warn!("request failed at interpretation: {e}");
            PipelineError::from(e)
        })?;
        log::debug!(
            "request {}: {} risk at {:.4}",
            Stage::Interpreted,
            verdict.risk_label(),
            verdict.confidence()
        );
        Ok(verdict)
    }
}
