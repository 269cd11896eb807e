//! Turn raw classifier output into a [`Verdict`].

use cardio_model::{ClassLabel, ClassProbabilities};
use cardio_schema::ClinicalRecord;
use thiserror::Error;

use crate::verdict::{RiskLabel, Verdict};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    #[error("classifier returned unknown class label {0}")]
    UnknownClassLabel(ClassLabel),
    #[error("invalid probability for class {label}: {reason}")]
    InvalidProbability { label: ClassLabel, reason: String },
}

/// Map the predicted class to a risk label and take the probability the
/// classifier assigned to that class as the confidence.
///
/// The confidence is the predicted class's own probability, which is not
/// necessarily the largest entry in `probabilities`.
pub fn interpret(
    label: ClassLabel,
    probabilities: &ClassProbabilities,
    record: ClinicalRecord,
) -> Result<Verdict, InterpretError> {
    let risk_label =
        RiskLabel::from_class(label).ok_or(InterpretError::UnknownClassLabel(label))?;
    let confidence = probabilities
        .get(label)
        .ok_or_else(|| InterpretError::InvalidProbability {
            label,
            reason: "no probability reported".into(),
        })?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(InterpretError::InvalidProbability {
            label,
            reason: format!("{confidence} is outside [0, 1]"),
        });
    }
    Ok(Verdict::new(risk_label, confidence, record))
}
