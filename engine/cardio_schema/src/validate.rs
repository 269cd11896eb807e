//! Boundary validation: raw input in, [`ClinicalRecord`] or the first failing field out.

use thiserror::Error;

use crate::field::{Domain, FieldSpec, FieldValue, SemanticType};
use crate::raw::{RawFields, RawValue};
use crate::record::ClinicalRecord;
use crate::schema::{fields, spec, FEATURE_COUNT};

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    #[error("required field is missing")]
    Missing,
    #[error("expected {expected}, found {found} `{value}`")]
    WrongType {
        expected: SemanticType,
        found: &'static str,
        value: String,
    },
    #[error("value {value} is outside the valid range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("code {code} is not one of {allowed}")]
    UnknownCode { code: i64, allowed: String },
    #[error("value must be a finite number")]
    NotFinite,
    #[error("field is not part of the schema")]
    UnknownField,
}

/// A rejected input, naming the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid field `{field}`: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Treat keys outside the schema as errors instead of ignoring them.
    pub reject_unknown_fields: bool,
}

impl ValidationOptions {
    pub fn strict() -> Self {
        Self {
            reject_unknown_fields: true,
        }
    }
}

/// Validate with default options (unknown keys ignored).
pub fn validate(raw: &RawFields) -> Result<ClinicalRecord, ValidationError> {
    validate_with(raw, ValidationOptions::default())
}

/// Check every schema field in order and stop at the first failure.
pub fn validate_with(
    raw: &RawFields,
    options: ValidationOptions,
) -> Result<ClinicalRecord, ValidationError> {
    let mut values = [FieldValue::Int(0); FEATURE_COUNT];
    for field_spec in fields() {
        let key = field_spec.key();
        let value = raw
            .get(key)
            .ok_or_else(|| ValidationError::new(key, ValidationErrorKind::Missing))?;
        values[field_spec.index()] =
            check_field(field_spec, value).map_err(|reason| ValidationError::new(key, reason))?;
    }

    for key in raw.keys().filter(|k| spec(k).is_none()) {
        if options.reject_unknown_fields {
            return Err(ValidationError::new(key, ValidationErrorKind::UnknownField));
        }
        log::debug!("ignoring unknown input field `{key}`");
    }

    Ok(ClinicalRecord::from_checked(&values))
}

/// Coerce one raw value to its semantic type and check its domain.
pub fn check_field(
    field_spec: &FieldSpec,
    raw: &RawValue,
) -> Result<FieldValue, ValidationErrorKind> {
    let value = coerce(field_spec.semantic, raw)?;
    if field_spec.domain.contains(value) {
        return Ok(value);
    }
    Err(match (field_spec.domain, value) {
        (Domain::Codes { codes }, FieldValue::Int(code)) => ValidationErrorKind::UnknownCode {
            code,
            allowed: Domain::Codes { codes }.to_string(),
        },
        (Domain::IntRange { min, max }, v) => ValidationErrorKind::OutOfRange {
            value: v.as_f64(),
            min: min as f64,
            max: max as f64,
        },
        (Domain::FloatRange { min, max }, v) => ValidationErrorKind::OutOfRange {
            value: v.as_f64(),
            min,
            max,
        },
        (Domain::Codes { .. }, FieldValue::Float(_)) => wrong_type(field_spec.semantic, raw),
    })
}

fn coerce(semantic: SemanticType, raw: &RawValue) -> Result<FieldValue, ValidationErrorKind> {
    match semantic {
        SemanticType::Float => match raw {
            RawValue::Float(x) if x.is_finite() => Ok(FieldValue::Float(*x)),
            RawValue::Float(_) => Err(ValidationErrorKind::NotFinite),
            RawValue::Int(i) => Ok(FieldValue::Float(*i as f64)),
            RawValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(FieldValue::Float(x)),
                Ok(_) => Err(ValidationErrorKind::NotFinite),
                Err(_) => Err(wrong_type(semantic, raw)),
            },
            RawValue::Bool(_) => Err(wrong_type(semantic, raw)),
        },
        SemanticType::Integer | SemanticType::Categorical | SemanticType::Binary => match raw {
            RawValue::Int(i) => Ok(FieldValue::Int(*i)),
            RawValue::Bool(b) if semantic == SemanticType::Binary => {
                Ok(FieldValue::Int(i64::from(*b)))
            }
            RawValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| wrong_type(semantic, raw)),
            // Fractional input is never truncated into an integer field.
            RawValue::Float(_) | RawValue::Bool(_) => Err(wrong_type(semantic, raw)),
        },
    }
}

fn wrong_type(expected: SemanticType, raw: &RawValue) -> ValidationErrorKind {
    ValidationErrorKind::WrongType {
        expected,
        found: raw.kind(),
        value: raw.to_string(),
    }
}
