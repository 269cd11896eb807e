//! Class labels and per-class probability maps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw class index as emitted by a classifier.
///
/// Only [`ClassLabel::NO_DISEASE`] and [`ClassLabel::DISEASE`] are meaningful;
/// other values are representable so that callers can reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabel(pub u32);

impl ClassLabel {
    pub const NO_DISEASE: ClassLabel = ClassLabel(0);
    pub const DISEASE: ClassLabel = ClassLabel(1);

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Probability assigned to each class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassProbabilities(BTreeMap<ClassLabel, f64>);

impl ClassProbabilities {
    /// Two-class distribution `{0: no_disease, 1: disease}`.
    pub fn binary(no_disease: f64, disease: f64) -> Self {
        let mut map = BTreeMap::new();
        map.insert(ClassLabel::NO_DISEASE, no_disease);
        map.insert(ClassLabel::DISEASE, disease);
        Self(map)
    }

    pub fn get(&self, label: ClassLabel) -> Option<f64> {
        self.0.get(&label).copied()
    }

    pub fn insert(&mut self, label: ClassLabel, p: f64) -> Option<f64> {
        self.0.insert(label, p)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Every entry is a finite non-negative number and the entries sum to one.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        !self.0.is_empty()
            && self.0.values().all(|p| p.is_finite() && *p >= 0.0)
            && (self.total() - 1.0).abs() <= tolerance
    }

    /// Highest-probability class; ties go to the lower label.
    pub fn argmax(&self) -> Option<ClassLabel> {
        let mut best: Option<(ClassLabel, f64)> = None;
        for (&label, &p) in &self.0 {
            match best {
                Some((_, bp)) if p <= bp => {}
                _ => best = Some((label, p)),
            }
        }
        best.map(|(label, _)| label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassLabel, f64)> + '_ {
        self.0.iter().map(|(l, p)| (*l, *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ClassLabel, f64)> for ClassProbabilities {
    fn from_iter<T: IntoIterator<Item = (ClassLabel, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
