//! Feature vector assembly.

use serde::Serialize;

use crate::record::ClinicalRecord;
use crate::schema::fields;

/// Ordered numeric encoding of a record, one slot per schema field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap arbitrary values. Intended for adapters and tests; vectors built
    /// from records should come from [`build`].
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Copy each field's numeric value into its schema position.
pub fn build(record: &ClinicalRecord) -> FeatureVector {
    FeatureVector(
        fields()
            .iter()
            .map(|spec| record.value(spec.field).as_f64())
            .collect(),
    )
}
