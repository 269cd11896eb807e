//! Human-facing rendering of verdicts, inputs and failures.

use std::fmt::Write as _;

use cardio_model::ModelError;
use cardio_schema::{fields, spec, ClinicalRecord, Field, ValidationErrorKind};
use serde::Serialize;

use crate::explain::FeatureContribution;
use crate::pipeline::PipelineError;
use crate::verdict::{RiskLabel, Verdict};

/// One-line verdict, e.g. `High Risk of Heart Disease (82.00% confidence)`.
pub fn render_verdict(verdict: &Verdict) -> String {
    let risk = match verdict.risk_label() {
        RiskLabel::High => "High",
        RiskLabel::Low => "Low",
    };
    format!(
        "{risk} Risk of Heart Disease ({:.2}% confidence)",
        verdict.confidence_percent()
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// The validated inputs in schema order, formatted for display.
pub fn input_summary(record: &ClinicalRecord) -> Vec<SummaryRow> {
    fields()
        .iter()
        .map(|spec| {
            let value = match spec.field {
                Field::Sex => record.sex().to_string(),
                field => {
                    let v = record.value(field).to_string();
                    match spec.unit {
                        Some(unit) => format!("{v} {unit}"),
                        None => v,
                    }
                }
            };
            SummaryRow {
                key: spec.key(),
                label: spec.label,
                value,
            }
        })
        .collect()
}

/// Two-column table of the inputs.
pub fn render_summary(record: &ClinicalRecord) -> String {
    let rows = input_summary(record);
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "{:<width$}  {}", row.label, row.value);
    }
    out
}

/// Ranked contributions as indented lines, largest first.
pub fn render_contributions(contributions: &[FeatureContribution]) -> String {
    let width = contributions
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for c in contributions {
        let _ = writeln!(out, "  {:<width$}  {:+.3}", c.label, c.contribution);
    }
    out
}

/// A message the user can act on. Validation failures name the field by its
/// display label and input key.
pub fn render_error(error: &PipelineError) -> String {
    match error {
        PipelineError::Validation(e) => {
            let Some(spec) = spec(&e.field) else {
                return format!("Unrecognized input `{}`; remove it or check its spelling.", e.field);
            };
            let hint = match &e.reason {
                ValidationErrorKind::Missing => "a value is required".to_string(),
                ValidationErrorKind::WrongType { expected, value, .. } => {
                    format!("expected {expected} but got `{value}`")
                }
                other => other.to_string(),
            };
            let name = if spec.label.ends_with(&format!("({})", spec.key())) {
                spec.label.to_string()
            } else {
                format!("{} ({})", spec.label, spec.key())
            };
            format!("Please check {name}: {hint}.")
        }
        PipelineError::Model(ModelError::Unavailable(_)) => {
            "The prediction model is not available. Check the model file and try again.".into()
        }
        PipelineError::Model(e) => format!("The prediction could not be completed: {e}."),
        PipelineError::Interpret(e) => format!("The model returned an unusable result: {e}."),
        PipelineError::SchemaMismatch(detail) => {
            format!("The model is incompatible with this input form: {detail}.")
        }
    }
}

/// Serializable summary of one verdict for machine-readable output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictReport {
    pub risk: RiskLabel,
    pub class_label: u32,
    pub confidence: f64,
    pub confidence_percent: f64,
    pub message: String,
    pub inputs: Vec<SummaryRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributions: Vec<FeatureContribution>,
}

impl VerdictReport {
    pub fn new(verdict: &Verdict) -> Self {
        Self {
            risk: verdict.risk_label(),
            class_label: verdict.risk_label().class().0,
            confidence: verdict.confidence(),
            confidence_percent: verdict.confidence_percent(),
            message: render_verdict(verdict),
            inputs: input_summary(verdict.record()),
            contributions: Vec::new(),
        }
    }

    pub fn with_contributions(mut self, contributions: Vec<FeatureContribution>) -> Self {
        self.contributions = contributions;
        self
    }
}
