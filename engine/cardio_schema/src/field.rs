//! Field identifiers and the per-field entries of the schema.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the thirteen clinical measurements collected per request.
///
/// The declaration order is the feature order the classifier was trained on;
/// [`Field::index`] and [`crate::schema::fields`] both rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "sex")]
    Sex,
    #[serde(rename = "cp")]
    ChestPainType,
    #[serde(rename = "trestbps")]
    RestingBloodPressure,
    #[serde(rename = "chol")]
    SerumCholesterol,
    #[serde(rename = "fbs")]
    FastingBloodSugar,
    #[serde(rename = "restecg")]
    RestingEcg,
    #[serde(rename = "thalach")]
    MaxHeartRate,
    #[serde(rename = "exang")]
    ExerciseAngina,
    #[serde(rename = "oldpeak")]
    StDepression,
    #[serde(rename = "slope")]
    StSlope,
    #[serde(rename = "ca")]
    MajorVessels,
    #[serde(rename = "thal")]
    Thalassemia,
}

impl Field {
    /// Every field, in vector order.
    pub const ALL: [Field; 13] = [
        Field::Age,
        Field::Sex,
        Field::ChestPainType,
        Field::RestingBloodPressure,
        Field::SerumCholesterol,
        Field::FastingBloodSugar,
        Field::RestingEcg,
        Field::MaxHeartRate,
        Field::ExerciseAngina,
        Field::StDepression,
        Field::StSlope,
        Field::MajorVessels,
        Field::Thalassemia,
    ];

    /// The key used for this field at the raw input boundary.
    pub fn key(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Sex => "sex",
            Field::ChestPainType => "cp",
            Field::RestingBloodPressure => "trestbps",
            Field::SerumCholesterol => "chol",
            Field::FastingBloodSugar => "fbs",
            Field::RestingEcg => "restecg",
            Field::MaxHeartRate => "thalach",
            Field::ExerciseAngina => "exang",
            Field::StDepression => "oldpeak",
            Field::StSlope => "slope",
            Field::MajorVessels => "ca",
            Field::Thalassemia => "thal",
        }
    }

    /// Look a field up by its raw input key. Keys are case-sensitive.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Position of this field in the feature vector.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How a raw value is interpreted before domain checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Integer,
    Float,
    Binary,
    Categorical,
}

impl SemanticType {
    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Binary => "binary",
            SemanticType::Categorical => "categorical",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valid values for a field. Ranges are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Domain {
    IntRange { min: i64, max: i64 },
    FloatRange { min: f64, max: f64 },
    Codes { codes: &'static [i64] },
}

impl Domain {
    pub fn contains(&self, value: FieldValue) -> bool {
        match (*self, value) {
            (Domain::IntRange { min, max }, FieldValue::Int(v)) => (min..=max).contains(&v),
            (Domain::FloatRange { min, max }, FieldValue::Float(v)) => {
                v.is_finite() && (min..=max).contains(&v)
            }
            (Domain::Codes { codes }, FieldValue::Int(v)) => codes.contains(&v),
            _ => false,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::IntRange { min, max } => write!(f, "[{min}, {max}]"),
            Domain::FloatRange { min, max } => write!(f, "[{min:.1}, {max:.1}]"),
            Domain::Codes { codes } => {
                let joined = codes
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{joined}}}")
            }
        }
    }
}

/// A checked numeric field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
}

impl FieldValue {
    /// The value as it appears in the feature vector.
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Int(v) => v as f64,
            FieldValue::Float(v) => v,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v:.1}"),
        }
    }
}

/// Schema entry for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub field: Field,
    pub semantic: SemanticType,
    pub domain: Domain,
    pub default: FieldValue,
    /// Human-readable label used by presentation layers.
    pub label: &'static str,
    pub unit: Option<&'static str>,
}

impl FieldSpec {
    pub fn key(&self) -> &'static str {
        self.field.key()
    }

    pub fn index(&self) -> usize {
        self.field.index()
    }
}
