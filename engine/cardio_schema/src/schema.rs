//! The static feature schema.
//!
//! The table below is the single source of truth for field order, domains and
//! defaults. The order must match the order the classifier was trained on.

use crate::field::{Domain, Field, FieldSpec, FieldValue, SemanticType};
use crate::raw::{RawFields, RawValue};

/// Length of every feature vector.
pub const FEATURE_COUNT: usize = 13;

const BINARY: Domain = Domain::Codes { codes: &[0, 1] };

static SCHEMA: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        field: Field::Age,
        semantic: SemanticType::Integer,
        domain: Domain::IntRange { min: 20, max: 90 },
        default: FieldValue::Int(50),
        label: "Age",
        unit: Some("years"),
    },
    FieldSpec {
        field: Field::Sex,
        semantic: SemanticType::Binary,
        domain: BINARY,
        default: FieldValue::Int(0),
        label: "Sex",
        unit: None,
    },
    FieldSpec {
        field: Field::ChestPainType,
        semantic: SemanticType::Categorical,
        domain: Domain::Codes {
            codes: &[0, 1, 2, 3],
        },
        default: FieldValue::Int(0),
        label: "Chest Pain Type (cp)",
        unit: None,
    },
    FieldSpec {
        field: Field::RestingBloodPressure,
        semantic: SemanticType::Integer,
        domain: Domain::IntRange { min: 80, max: 200 },
        default: FieldValue::Int(120),
        label: "Resting Blood Pressure (trestbps)",
        unit: Some("mmHg"),
    },
    FieldSpec {
        field: Field::SerumCholesterol,
        semantic: SemanticType::Integer,
        domain: Domain::IntRange { min: 100, max: 600 },
        default: FieldValue::Int(200),
        label: "Serum Cholesterol in mg/dl (chol)",
        unit: Some("mg/dl"),
    },
    FieldSpec {
        field: Field::FastingBloodSugar,
        semantic: SemanticType::Binary,
        domain: BINARY,
        default: FieldValue::Int(0),
        label: "Fasting Blood Sugar > 120 mg/dl (fbs)",
        unit: None,
    },
    FieldSpec {
        field: Field::RestingEcg,
        semantic: SemanticType::Categorical,
        domain: Domain::Codes { codes: &[0, 1, 2] },
        default: FieldValue::Int(0),
        label: "Resting ECG Results (restecg)",
        unit: None,
    },
    FieldSpec {
        field: Field::MaxHeartRate,
        semantic: SemanticType::Integer,
        domain: Domain::IntRange { min: 60, max: 220 },
        default: FieldValue::Int(150),
        label: "Maximum Heart Rate Achieved (thalach)",
        unit: Some("bpm"),
    },
    FieldSpec {
        field: Field::ExerciseAngina,
        semantic: SemanticType::Binary,
        domain: BINARY,
        default: FieldValue::Int(0),
        label: "Exercise Induced Angina (exang)",
        unit: None,
    },
    FieldSpec {
        field: Field::StDepression,
        semantic: SemanticType::Float,
        domain: Domain::FloatRange { min: 0.0, max: 6.0 },
        default: FieldValue::Float(1.0),
        label: "ST depression induced by exercise (oldpeak)",
        unit: None,
    },
    FieldSpec {
        field: Field::StSlope,
        semantic: SemanticType::Categorical,
        domain: Domain::Codes { codes: &[0, 1, 2] },
        default: FieldValue::Int(0),
        label: "Slope of the peak exercise ST segment (slope)",
        unit: None,
    },
    FieldSpec {
        field: Field::MajorVessels,
        semantic: SemanticType::Categorical,
        domain: Domain::Codes {
            codes: &[0, 1, 2, 3],
        },
        default: FieldValue::Int(0),
        label: "Number of major vessels (ca)",
        unit: None,
    },
    // Encoded as the form collected it; see DESIGN.md on the {1,3,6,7} variant.
    FieldSpec {
        field: Field::Thalassemia,
        semantic: SemanticType::Categorical,
        domain: Domain::Codes { codes: &[0, 1, 2] },
        default: FieldValue::Int(0),
        label: "Thalassemia (thal)",
        unit: None,
    },
];

/// All schema entries in vector order.
pub fn fields() -> &'static [FieldSpec; FEATURE_COUNT] {
    &SCHEMA
}

/// Raw input keys in the exact order the feature vector is assembled.
pub fn field_order() -> [&'static str; FEATURE_COUNT] {
    SCHEMA.map(|spec| spec.key())
}

/// Schema entry for a raw input key, if the key belongs to the schema.
pub fn spec(key: &str) -> Option<&'static FieldSpec> {
    Field::from_key(key).map(spec_for)
}

pub fn spec_for(field: Field) -> &'static FieldSpec {
    &SCHEMA[field.index()]
}

/// A complete raw input populated with every field's default value.
pub fn defaults() -> RawFields {
    SCHEMA
        .iter()
        .map(|spec| {
            let value = match spec.default {
                FieldValue::Int(v) => RawValue::Int(v),
                FieldValue::Float(v) => RawValue::Float(v),
            };
            (spec.key().to_string(), value)
        })
        .collect()
}
