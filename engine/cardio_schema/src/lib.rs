//! Feature schema and input boundary for cardiac risk inference.
//!
//! Raw input ([`RawFields`]) is validated against the static schema into a
//! typed [`ClinicalRecord`], which [`build`] turns into the ordered
//! [`FeatureVector`] a classifier consumes.

pub mod field;
pub mod raw;
pub mod record;
pub mod schema;
pub mod validate;
pub mod vector;

pub use field::{Domain, Field, FieldSpec, FieldValue, SemanticType};
pub use raw::{RawFields, RawInputError, RawValue};
pub use record::{ClinicalRecord, Sex};
pub use schema::{defaults, field_order, fields, spec, spec_for, FEATURE_COUNT};
pub use validate::{
    check_field, validate, validate_with, ValidationError, ValidationErrorKind, ValidationOptions,
};
pub use vector::{build, FeatureVector};
