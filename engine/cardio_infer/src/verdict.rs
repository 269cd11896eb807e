use std::fmt;

use cardio_model::ClassLabel;
use cardio_schema::ClinicalRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    /// `None` for any class outside the two the model was trained on.
    pub fn from_class(label: ClassLabel) -> Option<RiskLabel> {
        match label {
            ClassLabel::NO_DISEASE => Some(RiskLabel::Low),
            ClassLabel::DISEASE => Some(RiskLabel::High),
            _ => None,
        }
    }

    pub fn class(self) -> ClassLabel {
        match self {
            RiskLabel::Low => ClassLabel::NO_DISEASE,
            RiskLabel::High => ClassLabel::DISEASE,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::Low => f.write_str("LOW"),
            RiskLabel::High => f.write_str("HIGH"),
        }
    }
}

/// Round a probability to a percentage with two decimals, e.g. `0.82345 -> 82.35`.
pub fn round_percent(p: f64) -> f64 {
    (p * 10_000.0).round() / 100.0
}

/// Outcome of one inference request.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    risk_label: RiskLabel,
    confidence: f64,
    record: ClinicalRecord,
}

impl Verdict {
    pub(crate) fn new(risk_label: RiskLabel, confidence: f64, record: ClinicalRecord) -> Self {
        Self {
            risk_label,
            confidence,
            record,
        }
    }

    pub fn risk_label(&self) -> RiskLabel {
        self.risk_label
    }

    /// Unrounded probability of the predicted class, in `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Confidence on a 0–100 scale rounded to two decimals, for display.
    pub fn confidence_percent(&self) -> f64 {
        round_percent(self.confidence)
    }

    pub fn record(&self) -> &ClinicalRecord {
        &self.record
    }

    pub fn into_record(self) -> ClinicalRecord {
        self.record
    }
}
