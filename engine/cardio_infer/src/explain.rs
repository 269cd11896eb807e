use cardio_model::{ModelBackend, ModelError};
use cardio_schema::{fields, Field, FeatureVector, FEATURE_COUNT};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub field: Field,
    pub label: &'static str,
    pub value: f64,
    pub contribution: f64,
}

/// Per-field contributions to the model's decision score, in schema order.
/// `None` when the backend cannot attribute its output to features.
pub fn explain(
    model: &dyn ModelBackend,
    vector: &FeatureVector,
) -> Result<Option<Vec<FeatureContribution>>, ModelError> {
    let Some(contributions) = model.contributions(vector)? else {
        return Ok(None);
    };
    if contributions.len() != FEATURE_COUNT {
        return Err(ModelError::InvalidOutput(format!(
            "{} contributions for {} features",
            contributions.len(),
            FEATURE_COUNT
        )));
    }
    let out = fields()
        .iter()
        .zip(vector.iter())
        .zip(contributions)
        .map(|((spec, value), contribution)| FeatureContribution {
            field: spec.field,
            label: spec.label,
            value,
            contribution,
        })
        .collect();
    Ok(Some(out))
}

/// The `n` largest contributions by magnitude. Empty when unsupported.
pub fn top_contributions(
    model: &dyn ModelBackend,
    vector: &FeatureVector,
    n: usize,
) -> Result<Vec<FeatureContribution>, ModelError> {
    let mut all = explain(model, vector)?.unwrap_or_default();
    all.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    all.truncate(n);
    Ok(all)
}
